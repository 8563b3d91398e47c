use oas_params_core::{
    BodyDecoder, Codec, CodecConfig, CodecResult, ErrorKind, FilePart, ParamMap, ParamRecord,
    ParamValue, PathParams, RawRequest, TransportRequest,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq, ParamRecord)]
pub struct Filter {
    #[param("type")]
    pub kind: String,
    #[param("color")]
    pub color: String,
}

#[derive(Debug, Default, Clone, PartialEq, ParamRecord)]
pub struct Point {
    #[param("x")]
    pub x: i32,
    #[param("y")]
    pub y: i32,
}

#[derive(Debug, Default, Clone, PartialEq, ParamRecord)]
pub struct GetOrders {
    #[param("id,in=path")]
    pub id: u64,
    #[param("coords,in=path,style=matrix,explode=true")]
    pub coords: Point,
    #[param("ids")]
    pub ids: Vec<u32>,
    #[param("filter,style=deepObject")]
    pub filter: Filter,
    #[param("sort,style=pipeDelimited")]
    pub sort: Vec<String>,
    #[param("X-Request-Id,in=header")]
    pub request_id: String,
    #[param("X-Tags,in=header")]
    pub tags: Vec<String>,
    #[param("session,in=cookie")]
    pub session: String,
    #[param("prefs,in=cookie,explode=false")]
    pub prefs: Vec<String>,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct Payload {
    #[param("name")]
    pub name: String,
    #[param("age")]
    pub age: u32,
    #[param("tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct CreateUser {
    #[param("dry_run")]
    pub dry_run: bool,
    #[body("structured,required")]
    pub user: Payload,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct SetAvatar {
    #[param("id,in=path")]
    pub id: u64,
    #[body("file")]
    pub avatar: FilePart,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct UploadForm {
    #[param("title")]
    pub title: String,
    #[param("file")]
    pub file: FilePart,
    #[param("labels")]
    pub labels: Vec<String>,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct Upload {
    #[body("multipart")]
    pub form: UploadForm,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct Collide {
    #[param("id")]
    pub from_query: String,
    #[param("id,in=header")]
    pub from_header: String,
}

#[derive(Debug, Default, PartialEq, ParamRecord)]
pub struct GetPage {
    #[param("slug,in=path,style=label")]
    pub slug: String,
    #[param("parts,in=path,style=label,explode=true")]
    pub parts: Vec<u32>,
    #[param("page")]
    pub page: u32,
}

fn path(entries: &[(&str, &str)]) -> PathParams {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn sample_orders() -> GetOrders {
    GetOrders {
        id: 42,
        coords: Point { x: 1, y: -2 },
        ids: vec![1, 2],
        filter: Filter {
            kind: "car".into(),
            color: "red".into(),
        },
        sort: vec!["asc".into(), "desc".into()],
        request_id: "abc-1".into(),
        tags: vec!["a".into(), "b".into()],
        session: "s1".into(),
        prefs: vec!["dark".into(), "compact".into()],
    }
}

#[test]
fn test_decode_request_all_locations() {
    let codec = Codec::new();
    let request = RawRequest::new()
        .with_query("?ids=1&ids=2&filter[type]=car&filter[color]=red&sort=asc|desc")
        .with_header("X-Request-Id", "abc-1")
        .with_header("x-tags", "a,b")
        .with_cookie("session", "s1")
        .with_cookie("prefs", "dark,compact");
    let params = path(&[("id", "42"), ("coords", ";x=1;y=-2")]);

    let orders: GetOrders = codec.decode_request(&request, &params).unwrap();
    assert_eq!(orders, sample_orders());
}

#[test]
fn test_decode_request_normalizes_single_values() {
    let codec = Codec::new();
    let request = RawRequest::new()
        .with_query("ids=9")
        .with_header("X-Tags", "solo")
        .with_cookie("prefs", "dark");
    let orders: GetOrders = codec
        .decode_request(&request, &path(&[("id", "7")]))
        .unwrap();
    assert_eq!(orders.id, 7);
    assert_eq!(orders.ids, vec![9]);
    assert_eq!(orders.tags, vec!["solo".to_string()]);
    assert_eq!(orders.prefs, vec!["dark".to_string()]);
    assert_eq!(orders.filter, Filter::default());
}

#[test]
fn test_decode_request_through_trait_object() {
    let codec = Codec::new();
    let request = RawRequest::new().with_query("ids=3");
    let dynamic: &dyn TransportRequest = &request;
    let orders = codec
        .decode_request::<GetOrders, dyn TransportRequest>(dynamic, &PathParams::new())
        .unwrap();
    assert_eq!(orders.ids, vec![3]);
}

#[test]
fn test_decode_request_conversion_error() {
    let codec = Codec::new();
    let err = codec
        .decode_request::<GetOrders, _>(&RawRequest::new(), &path(&[("id", "forty-two")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(err.to_string().contains("'id'"));
}

#[test]
fn test_encode_parts_round_trip() {
    let codec = Codec::new();
    let orders = sample_orders();
    let parts = codec.encode_parts(&orders).unwrap();

    assert_eq!(
        parts.query,
        "ids=1&ids=2&filter%5Btype%5D=car&filter%5Bcolor%5D=red&sort=asc|desc"
    );
    assert_eq!(parts.path.get("id").map(String::as_str), Some("42"));
    assert_eq!(parts.path.get("coords").map(String::as_str), Some(";x=1;y=-2"));
    assert_eq!(
        parts.headers,
        vec![
            ("X-Request-Id".to_string(), "abc-1".to_string()),
            ("X-Tags".to_string(), "a,b".to_string()),
        ]
    );
    assert_eq!(
        parts.cookie_header().as_deref(),
        Some("session=s1; prefs=dark,compact")
    );
    assert_eq!(
        parts.expand_path("/orders/{id}/at{coords}"),
        "/orders/42/at;x=1;y=-2"
    );

    let request = RawRequest::from_parts(&parts);
    let back: GetOrders = codec.decode_request(&request, &parts.path).unwrap();
    assert_eq!(back, orders);
}

#[test]
fn test_label_path_values_bind_by_shape() {
    let codec = Codec::new();
    let page: GetPage = codec
        .decode_request(
            &RawRequest::new().with_query("page=3"),
            &path(&[("slug", ".intro"), ("parts", ".7")]),
        )
        .unwrap();
    assert_eq!(page.slug, "intro");
    assert_eq!(page.parts, vec![7]);
    assert_eq!(page.page, 3);
}

#[test]
fn test_undeclared_query_keys_are_ignored() {
    let codec = Codec::new();
    let request = RawRequest::new().with_query("page=2&utm=a&utm.source=b&x[a]=1&x=2");
    let page: GetPage = codec.decode_request(&request, &PathParams::new()).unwrap();
    assert_eq!(page.page, 2);

    let orders: GetOrders = codec
        .decode_request(
            &RawRequest::new().with_query("ids=4&filter[type]=van&ref=a&ref.id=b"),
            &path(&[("id", "1")]),
        )
        .unwrap();
    assert_eq!(orders.ids, vec![4]);
    assert_eq!(orders.filter.kind, "van");
}

#[test]
fn test_location_collision_keeps_first() {
    let codec = Codec::new();
    let request = RawRequest::new()
        .with_query("id=from-query")
        .with_header("id", "from-header");
    let collide: Collide = codec
        .decode_request(&request, &PathParams::new())
        .unwrap();
    assert_eq!(collide.from_query, "from-query");
    assert_eq!(collide.from_header, "from-query");
}

#[test]
fn test_json_body() {
    let codec = Codec::new();
    let request = RawRequest::new()
        .with_query("dry_run=true")
        .with_body(
            "application/json; charset=utf-8",
            r#"{"name":"ada","age":36,"tags":["math"],"ignored":null}"#,
        );
    let create: CreateUser = codec
        .decode_request(&request, &PathParams::new())
        .unwrap();
    assert_eq!(
        create,
        CreateUser {
            dry_run: true,
            user: Payload {
                name: "ada".into(),
                age: 36,
                tags: vec!["math".into()],
            },
        }
    );

    // Without a content type the body is read as JSON.
    let untyped = RawRequest::new().with_body("", r#"{"name":"bo"}"#);
    let create: CreateUser = codec
        .decode_request(&untyped, &PathParams::new())
        .unwrap();
    assert_eq!(create.user.name, "bo");
}

#[test]
fn test_form_urlencoded_body() {
    let codec = Codec::new();
    let request = RawRequest::new().with_body(
        "application/x-www-form-urlencoded",
        "name=ada+lovelace&age=36&tags=math",
    );
    let create: CreateUser = codec
        .decode_request(&request, &PathParams::new())
        .unwrap();
    assert_eq!(create.user.name, "ada lovelace");
    assert_eq!(create.user.tags, vec!["math".to_string()]);
}

#[test]
fn test_body_errors() {
    let codec = Codec::new();
    let empty = PathParams::new();

    let malformed = RawRequest::new().with_body("application/json", "{\"name\":");
    let err = codec
        .decode_request::<CreateUser, _>(&malformed, &empty)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Body);

    let xml = RawRequest::new().with_body("application/xml", "<user/>");
    let err = codec.decode_request::<CreateUser, _>(&xml, &empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Body);
    assert!(err.to_string().contains("application/xml"));

    let small = Codec::builder()
        .config(CodecConfig {
            max_body_bytes: 4,
            ..CodecConfig::default()
        })
        .build();
    let big = RawRequest::new().with_body("application/json", r#"{"name":"ada"}"#);
    let err = small.decode_request::<CreateUser, _>(&big, &empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Body);
    assert!(err.to_string().contains("exceeds"));

    // No body at all leaves the field untouched.
    let none: CreateUser = codec.decode_request(&RawRequest::new(), &empty).unwrap();
    assert_eq!(none.user, Payload::default());
}

struct KeyValueLines;

impl BodyDecoder for KeyValueLines {
    fn accepts(&self, mime: &str) -> bool {
        mime == "text/x-lines"
    }

    fn decode(&self, body: &[u8]) -> CodecResult<ParamValue> {
        let text = String::from_utf8_lossy(body);
        let map: ParamMap = text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), ParamValue::from(v.trim())))
            .collect();
        Ok(ParamValue::Map(map))
    }
}

#[test]
fn test_pluggable_body_decoder() {
    let codec = Codec::builder().body_decoder(KeyValueLines).build();
    let request = RawRequest::new().with_body("text/x-lines", "name: ada\nage: 36\ntags: x");
    let create: CreateUser = codec
        .decode_request(&request, &PathParams::new())
        .unwrap();
    assert_eq!(create.user.age, 36);
    assert_eq!(create.user.tags, vec!["x".to_string()]);
}

#[test]
fn test_file_body() {
    let codec = Codec::new();
    let request = RawRequest::new().with_body("image/png", vec![0x89, b'P', b'N', b'G']);
    let avatar: SetAvatar = codec
        .decode_request(&request, &path(&[("id", "5")]))
        .unwrap();
    assert_eq!(avatar.id, 5);
    assert_eq!(avatar.avatar.content_type.as_deref(), Some("image/png"));
    assert_eq!(avatar.avatar.data, vec![0x89, b'P', b'N', b'G']);
    assert!(avatar.avatar.file_name.is_none());
}

#[test]
fn test_multipart_body() {
    let codec = Codec::new();
    let body = concat!(
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"title\"\r\n",
        "\r\n",
        "Holiday\r\n",
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "hello\r\n",
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"labels\"\r\n",
        "\r\n",
        "sea\r\n",
        "--XyZ--\r\n",
    );
    let request = RawRequest::new().with_body("multipart/form-data; boundary=XyZ", body);
    let upload: Upload = codec
        .decode_request(&request, &PathParams::new())
        .unwrap();

    assert_eq!(upload.form.title, "Holiday");
    assert_eq!(upload.form.labels, vec!["sea".to_string()]);
    assert_eq!(upload.form.file.file_name.as_deref(), Some("notes.txt"));
    assert_eq!(upload.form.file.content_type.as_deref(), Some("text/plain"));
    assert_eq!(upload.form.file.data, b"hello".to_vec());

    let err = codec
        .decode_request::<Upload, _>(
            &RawRequest::new().with_body("multipart/form-data", body),
            &PathParams::new(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Body);
}

#[test]
fn test_encode_into_url() {
    let codec = Codec::new();
    let mut url = url::Url::parse("https://api.example.com/orders?page=2").unwrap();
    let mut tree = ParamMap::new();
    tree.insert("ids".into(), ParamValue::from(vec!["1", "2"]));
    codec
        .encode_into_url(
            &mut url,
            &ParamValue::Map(tree),
            &oas_params_core::Options::default(),
        )
        .unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/orders?page=2&ids=1&ids=2");
}
