use rss::{Channel, Item};
use std::fmt;

use super::types::{RemoteFeedDocument, RemoteItem};

#[derive(Debug)]
pub struct DecodeError(pub rss::Error);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed RSS document: {}", self.0)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.0) }
}

pub fn parse_document(xml: &[u8]) -> Result<RemoteFeedDocument, DecodeError> {
    let ch = Channel::read_from(xml).map_err(DecodeError)?;
    Ok(RemoteFeedDocument {
        title: unescape(ch.title()),
        description: unescape(ch.description()),
        link: ch.link().to_string(),
        items: ch.items().iter().map(remote_item).collect(),
    })
}

fn remote_item(item: &Item) -> RemoteItem {
    RemoteItem {
        title: unescape(item.title().unwrap_or_default()),
        link: item.link().unwrap_or_default().trim().to_string(),
        description: unescape(item.description().unwrap_or_default()),
        pub_date: item.pub_date().unwrap_or_default().to_string(),
    }
}

// XML decoding already resolved one level of entities; feeds that
// double-encode still carry `&amp;` and friends in the text.
fn unescape(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Boot.dev &amp;amp; Friends</title>
    <link>https://blog.boot.dev/</link>
    <description>Learn &amp;lt;code&amp;gt;</description>
    <item>
      <title>Rust &amp;amp; Go</title>
      <link>https://blog.boot.dev/rust-and-go/</link>
      <description>It&amp;#39;s a &amp;quot;comparison&amp;quot;</description>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title>No date</title>
      <link> https://blog.boot.dev/no-date/ </link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_channel_and_items_in_order() {
        let doc = parse_document(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.link, "https://blog.boot.dev/");
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].link, "https://blog.boot.dev/rust-and-go/");
        assert_eq!(doc.items[0].pub_date, "Tue, 02 Jan 2024 10:00:00 +0000");
        assert_eq!(doc.items[1].title, "No date");
        assert_eq!(doc.items[1].link, "https://blog.boot.dev/no-date/");
        assert_eq!(doc.items[1].pub_date, "");
        assert_eq!(doc.items[1].description, "");
    }

    #[test]
    fn double_encoded_entities_are_unescaped() {
        let doc = parse_document(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.title, "Boot.dev & Friends");
        assert_eq!(doc.description, "Learn <code>");
        assert_eq!(doc.items[0].title, "Rust & Go");
        assert_eq!(doc.items[0].description, "It's a \"comparison\"");
    }

    #[test]
    fn malformed_xml_is_a_decode_error() {
        let err = parse_document(b"<rss><channel><title>broken").unwrap_err();
        assert!(err.to_string().starts_with("malformed RSS document"));
        assert!(parse_document(b"not xml at all").is_err());
    }
}
