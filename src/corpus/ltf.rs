//! LDC LTF (tokenized XML) to raw source text.
//!
//! LTF files carry each segment's original text together with its character
//! offsets. Rebuilding the source means placing every segment at its offset,
//! padding the gaps with newlines, and checking the MD5 recorded on `<DOC>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::LtfError;

static DOC_ATTRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"raw_text_char_length="(\d+)" raw_text_md5="(\w+)""#).expect("valid DOC regex")
});

static SEG_OFFSETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<SEG .*?start_char="(\d+)" end_char="(\d+)""#).expect("valid SEG regex")
});

static ORIGINAL_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<ORIGINAL_TEXT>(.*?)<").expect("valid ORIGINAL_TEXT regex")
});

/// Convert an LTF document to the original source text.
pub fn convert_ltf_to_raw_text(xml: &str) -> Result<String, LtfError> {
    let mut raw = String::new();
    // Length of `raw` in characters; LTF offsets count characters, not bytes.
    let mut raw_len = 0usize;
    let mut last_offset = 0usize;
    let mut start_char = 0usize;
    let mut end_char = 0usize;
    let mut expected_len = 0usize;
    let mut expected_md5 = String::new();

    for line in xml.split('\n') {
        if line.contains("<DOC ") {
            let caps = DOC_ATTRS
                .captures(line)
                .ok_or_else(|| LtfError::MalformedDoc {
                    line: line.to_string(),
                })?;
            expected_len = parse_number(&caps[1], line)?;
            expected_md5 = caps[2].to_string();
        } else if let Some(caps) = SEG_OFFSETS.captures(line) {
            start_char = parse_number(&caps[1], line)?;
            end_char = parse_number(&caps[2], line)?;
        } else if let Some(caps) = ORIGINAL_TEXT.captures(line) {
            let text = unescape(&caps[1]);
            if start_char > last_offset {
                let gap = start_char - last_offset;
                raw.extend(std::iter::repeat_n('\n', gap));
                raw_len += gap;
            }
            raw.push_str(&text);
            raw.push('\n');
            raw_len += text.chars().count() + 1;
            last_offset = end_char + 2;
        }
    }

    if raw_len < expected_len {
        raw.extend(std::iter::repeat_n('\n', expected_len - raw_len));
    }

    let actual_md5 = format!("{:x}", md5::compute(raw.as_bytes()));
    if actual_md5 != expected_md5 {
        return Err(LtfError::ChecksumMismatch {
            expected: expected_md5,
            actual: actual_md5,
        });
    }
    Ok(raw)
}

fn parse_number(digits: &str, line: &str) -> Result<usize, LtfError> {
    digits.parse().map_err(|_| LtfError::MalformedDoc {
        line: line.to_string(),
    })
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal LTF document whose checksum matches `expected_raw`.
    pub(crate) fn ltf_document(
        doc_id: &str,
        segments: &[(usize, &str)],
        expected_raw: &str,
    ) -> String {
        let md5 = format!("{:x}", md5::compute(expected_raw.as_bytes()));
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<LCTL_TEXT>\n");
        xml.push_str(&format!(
            "<DOC id=\"{doc_id}\" lang=\"eng\" raw_text_char_length=\"{}\" raw_text_md5=\"{md5}\" tokenization=\"tokenization_parameters.v5.0\">\n<TEXT>\n",
            expected_raw.chars().count()
        ));
        for (i, (start, text)) in segments.iter().enumerate() {
            let len = html_unescaped_len(text);
            xml.push_str(&format!(
                "<SEG id=\"segment-{i}\" start_char=\"{start}\" end_char=\"{}\">\n<ORIGINAL_TEXT>{text}</ORIGINAL_TEXT>\n</SEG>\n",
                start + len - 1
            ));
        }
        xml.push_str("</TEXT>\n</DOC>\n</LCTL_TEXT>\n");
        xml
    }

    fn html_unescaped_len(text: &str) -> usize {
        unescape(text).chars().count()
    }

    #[test]
    fn rebuilds_text_with_gaps_and_padding() {
        let expected = "Hello world.\n\nBye <now>.\n\n\n";
        let xml = ltf_document(
            "HC0001",
            &[(0, "Hello world."), (14, "Bye &lt;now&gt;.")],
            expected,
        );
        assert_eq!(convert_ltf_to_raw_text(&xml).unwrap(), expected);
    }

    #[test]
    fn offsets_count_characters() {
        let expected = "Київ.\n\nМісто.\n";
        let xml = ltf_document("HC0002", &[(0, "Київ."), (7, "Місто.")], expected);
        assert_eq!(convert_ltf_to_raw_text(&xml).unwrap(), expected);
    }

    #[test]
    fn checksum_mismatch_is_an_error() {
        let xml = ltf_document("HC0003", &[(0, "Text.")], "Different.\n");
        assert!(matches!(
            convert_ltf_to_raw_text(&xml),
            Err(LtfError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn malformed_doc_line_is_an_error() {
        let xml = "<DOC id=\"x\" lang=\"eng\">\n";
        assert!(matches!(
            convert_ltf_to_raw_text(xml),
            Err(LtfError::MalformedDoc { .. })
        ));
    }
}
