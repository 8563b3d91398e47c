//! `multipart/form-data` bodies.
//!
//! Parts with a file name or a non-text content type become
//! [`ParamValue::Binary`]; the rest are text leaves. Repeated part names
//! become lists.

use super::body::{mime_essence, mime_param, MULTIPART_FORM_DATA};
use crate::error::{CodecError, CodecResult};
use crate::value::{FilePart, ParamMap, ParamValue};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

struct Part {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::body(MULTIPART_FORM_DATA, reason)
}

/// Parses a multipart body into a mapping of part name to value.
pub fn parse_multipart(content_type: &str, body: &[u8]) -> CodecResult<ParamMap> {
    if mime_essence(content_type) != MULTIPART_FORM_DATA {
        return Err(CodecError::body(
            content_type,
            "a multipart body requires a multipart/form-data content type",
        ));
    }
    let boundary = mime_param(content_type, "boundary")
        .filter(|b| !b.is_empty())
        .ok_or_else(|| malformed("missing boundary parameter"))?;

    let mut out = ParamMap::new();
    for part in split_parts(body, &boundary)? {
        let value = part_value(part.file_name, part.content_type, part.data)?;
        match out.get_mut(&part.name) {
            Some(ParamValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, ParamValue::List(Vec::new()));
                *existing = ParamValue::List(vec![first, value]);
            }
            None => {
                out.insert(part.name, value);
            }
        }
    }
    Ok(out)
}

fn split_parts(body: &[u8], boundary: &str) -> CodecResult<Vec<Part>> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let next_delimiter = format!("\r\n--{}", boundary).into_bytes();

    let mut pos = find(body, &delimiter, 0).ok_or_else(|| malformed("opening boundary not found"))?
        + delimiter.len();
    let mut parts = Vec::new();

    loop {
        if body[pos..].starts_with(b"--") {
            return Ok(parts);
        }
        if !body[pos..].starts_with(CRLF) {
            return Err(malformed("boundary is not followed by a line break"));
        }
        pos += CRLF.len();

        let header_end =
            find(body, HEADER_END, pos).ok_or_else(|| malformed("part headers are not terminated"))?;
        let headers = std::str::from_utf8(&body[pos..header_end])
            .map_err(|_| malformed("part headers are not valid UTF-8"))?;
        let content_start = header_end + HEADER_END.len();
        let content_end = find(body, &next_delimiter, content_start)
            .ok_or_else(|| malformed("closing boundary not found"))?;

        parts.push(parse_part(headers, body[content_start..content_end].to_vec())?);
        pos = content_end + next_delimiter.len();
    }
}

fn parse_part(headers: &str, data: Vec<u8>) -> CodecResult<Part> {
    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;

    for line in headers.split("\r\n") {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        let header = header.trim();
        if header.eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((key, val)) = param.split_once('=') else {
                    continue;
                };
                let val = val.trim().trim_matches('"').to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "name" => name = Some(val),
                    "filename" => file_name = Some(val),
                    _ => {}
                }
            }
        } else if header.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let name = name.ok_or_else(|| malformed("part has no name in Content-Disposition"))?;
    Ok(Part {
        name,
        file_name,
        content_type,
        data,
    })
}

fn part_value(
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
) -> CodecResult<ParamValue> {
    let is_text = content_type
        .as_deref()
        .map_or(true, |ct| mime_essence(ct).starts_with("text/"));
    if file_name.is_none() && is_text {
        return String::from_utf8(data)
            .map(ParamValue::String)
            .map_err(|_| malformed("text part is not valid UTF-8"));
    }
    Ok(ParamValue::Binary(FilePart {
        file_name,
        content_type,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Read;

    const CT: &str = "multipart/form-data; boundary=XyZ";

    fn body() -> Vec<u8> {
        [
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"title\"\r\n\r\n",
            "Holiday\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"tags\"\r\n\r\n",
            "a\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"tags\"\r\n\r\n",
            "b\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"photo\"; filename=\"p.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "\u{1}PNG\r\n",
            "--XyZ--\r\n",
        ]
        .concat()
        .into_bytes()
    }

    #[test]
    fn test_parse_parts() {
        let parts = parse_multipart(CT, &body()).unwrap();
        assert_eq!(parts["title"], ParamValue::from("Holiday"));
        assert_eq!(parts["tags"], ParamValue::from(vec!["a", "b"]));

        let ParamValue::Binary(photo) = &parts["photo"] else {
            panic!("photo should be binary");
        };
        assert_eq!(photo.file_name.as_deref(), Some("p.png"));
        assert_eq!(photo.content_type.as_deref(), Some("image/png"));
        let mut bytes = Vec::new();
        photo.reader().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, b"\x01PNG");
    }

    #[test]
    fn test_missing_boundary() {
        let err = parse_multipart("multipart/form-data", &body()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Body);
    }

    #[test]
    fn test_truncated_body() {
        let err = parse_multipart(CT, b"--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nx")
            .unwrap_err();
        assert!(err.to_string().contains("closing boundary"));
    }

    #[test]
    fn test_wrong_content_type() {
        assert!(parse_multipart("application/json", &body()).is_err());
    }
}
