use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::ErrorKind;
use std::path::Path;

use fieldx::fxstruct;
use quick_xml::encoding::Decoder;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

use crate::types::ForecastError;
use crate::types::Result;

/// One item entry of the source document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub name:     String,
    pub price:    f64,
    pub category: String,
}

/// Offers in document order, unique by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    offers: Vec<Offer>,
}

impl Catalog {
    /// Collect offers keeping the first position of a name; a repeated name overwrites price and category.
    pub fn from_offers<I: IntoIterator<Item = Offer>>(offers: I) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<Offer> = Vec::new();

        for offer in offers {
            if let Some(&pos) = index.get(&offer.name) {
                warn!(name = %offer.name, "Duplicate offer name, the later entry wins");
                unique[pos] = offer;
            }
            else {
                index.insert(offer.name.clone(), unique.len());
                unique.push(offer);
            }
        }

        Self { offers: unique }
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offer> {
        self.offers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.name == name)
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    Price,
    Category,
}

#[derive(Default)]
struct OfferDraft {
    depth:    usize,
    name:     Option<String>,
    price:    Option<String>,
    category: Option<String>,
}

impl OfferDraft {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Price => &mut self.price,
            Field::Category => &mut self.category,
        }
    }

    /// Claim a field for the element being opened. Only the first occurrence of a field counts.
    fn open(&mut self, field: Option<Field>) -> Option<Field> {
        let field = field?;
        let slot = self.slot(field);
        if slot.is_some() {
            return None;
        }
        // An element that is present but empty still counts as present.
        *slot = Some(String::new());
        Some(field)
    }

    fn finish(self, index: usize) -> Result<Offer> {
        let name = self.name.ok_or(ForecastError::MissingField { index, field: "name" })?;
        let raw_price = self.price.ok_or(ForecastError::MissingField { index, field: "price" })?;
        let category = self.category.ok_or(ForecastError::MissingField { index, field: "param" })?;
        let price = raw_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| ForecastError::InvalidPrice {
                name:  name.clone(),
                value: raw_price.clone(),
            })?;

        Ok(Offer { name, price, category })
    }
}

/// Reads offers out of a YML-like catalog document.
///
/// Offers are looked up at any depth of the document. The name, the price and the category `<param>` must be direct
/// children of an offer; the category param is recognized by its `name` attribute. When a field is repeated within an
/// offer the first one is used.
#[derive(Debug)]
#[fxstruct(no_new, builder, get)]
pub struct CatalogReader {
    #[fieldx(default("Миссия".to_string()))]
    category_param: String,

    #[fieldx(default("offer".to_string()))]
    offer_tag: String,
}

impl CatalogReader {
    /// Parse a catalog file. The text encoding is taken from the BOM or the XML declaration, UTF-8 otherwise.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.display()))]
    pub fn read_file(&self, path: &Path) -> Result<Catalog> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ForecastError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ForecastError::Io(err),
        })?;

        self.parse(&path.display().to_string(), Reader::from_reader(BufReader::new(file)))
    }

    /// Parse an in-memory document. `origin` only names the document in error messages.
    pub fn read_str(&self, origin: &str, xml: &str) -> Result<Catalog> {
        self.parse(origin, Reader::from_str(xml))
    }

    fn parse<R: BufRead>(&self, origin: &str, mut reader: Reader<R>) -> Result<Catalog> {
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut root_seen = false;
        let mut draft: Option<OfferDraft> = None;
        let mut field: Option<Field> = None;
        let mut offers = Vec::new();

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf).map_err(|err| match err {
                quick_xml::Error::Io(err) => ForecastError::Io(io::Error::new(err.kind(), err.to_string())),
                err => malformed(
                    origin,
                    format_args!("{err} at position {}", reader.buffer_position()),
                ),
            })?;

            match event {
                Event::Start(start) => {
                    if depth == 0 && root_seen {
                        return Err(malformed(origin, "content after the root element"));
                    }
                    root_seen = true;
                    depth += 1;

                    if let Some(d) = draft.as_mut() {
                        if field.is_none() && depth == d.depth + 1 {
                            field = d.open(self.field_of(&start, reader.decoder(), origin)?);
                        }
                    }
                    else if start.local_name().as_ref() == self.offer_tag.as_bytes() {
                        draft = Some(OfferDraft {
                            depth,
                            ..Default::default()
                        });
                    }
                }
                Event::Empty(start) => {
                    if depth == 0 && root_seen {
                        return Err(malformed(origin, "content after the root element"));
                    }
                    root_seen = true;

                    if let Some(d) = draft.as_mut() {
                        if field.is_none() && depth == d.depth {
                            d.open(self.field_of(&start, reader.decoder(), origin)?);
                        }
                    }
                    else if start.local_name().as_ref() == self.offer_tag.as_bytes() {
                        offers.push(OfferDraft::default().finish(offers.len())?);
                    }
                }
                Event::Text(text) => {
                    if depth == 0 {
                        return Err(malformed(origin, "text outside the root element"));
                    }
                    let text = text.unescape().map_err(|err| malformed(origin, err))?;
                    if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                        d.slot(f).get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(cdata) => {
                    if depth == 0 {
                        return Err(malformed(origin, "text outside the root element"));
                    }
                    let text = cdata.decode().map_err(|err| malformed(origin, err))?;
                    if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                        d.slot(f).get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Err(malformed(origin, "unexpected closing tag"));
                    }

                    match draft.as_ref().map(|d| d.depth) {
                        Some(offer_depth) if depth == offer_depth + 1 => field = None,
                        Some(offer_depth) if depth == offer_depth => {
                            if let Some(d) = draft.take() {
                                let offer = d.finish(offers.len())?;
                                debug!(name = %offer.name, price = offer.price, "Parsed offer");
                                offers.push(offer);
                            }
                        }
                        _ => (),
                    }
                    depth -= 1;
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if depth != 0 {
            return Err(malformed(origin, "unexpected end of document"));
        }
        if !root_seen {
            return Err(malformed(origin, "no element found"));
        }

        Ok(Catalog::from_offers(offers))
    }

    fn field_of(&self, start: &BytesStart, decoder: Decoder, origin: &str) -> Result<Option<Field>> {
        Ok(match start.local_name().as_ref() {
            b"name" => Some(Field::Name),
            b"price" => Some(Field::Price),
            b"param" => {
                let attr = start.try_get_attribute("name").map_err(|err| malformed(origin, err))?;
                match attr {
                    Some(attr) => {
                        let value = attr
                            .decode_and_unescape_value(decoder)
                            .map_err(|err| malformed(origin, err))?;
                        (value == self.category_param).then_some(Field::Category)
                    }
                    None => None,
                }
            }
            _ => None,
        })
    }
}

fn malformed(origin: impl Display, reason: impl Display) -> ForecastError {
    ForecastError::Malformed {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<yml_catalog date="2024-01-01">
  <shop>
    <offers>
      <offer id="1">
        <name>Curiosity</name>
        <price>2500000.5</price>
        <param name="Миссия">Mars Science Laboratory</param>
        <param name="Вес">899</param>
      </offer>
      <offer id="2">
        <name>Opportunity &amp; Co</name>
        <price> 820000 </price>
        <param name="Миссия"><![CDATA[Mars Exploration Rover]]></param>
      </offer>
    </offers>
  </shop>
</yml_catalog>"#;

    fn reader() -> CatalogReader {
        CatalogReader::builder().build().unwrap()
    }

    #[test]
    fn test_read_offers() {
        let catalog = reader().read_str("test", CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);

        let curiosity = catalog.get("Curiosity").unwrap();
        assert_eq!(curiosity.price, 2500000.5);
        assert_eq!(curiosity.category, "Mars Science Laboratory");

        let opportunity = &catalog.offers()[1];
        assert_eq!(opportunity.name, "Opportunity & Co");
        assert_eq!(opportunity.price, 820000.0);
        assert_eq!(opportunity.category, "Mars Exploration Rover");
    }

    #[test]
    fn test_custom_category_param() {
        let reader = CatalogReader::builder()
            .category_param("Вес".to_string())
            .build()
            .unwrap();
        let err = reader.read_str("test", CATALOG).unwrap_err();
        // The second offer has no "Вес" param.
        assert!(matches!(err, ForecastError::MissingField { index: 1, field: "param" }));
    }

    #[test]
    fn test_nested_name_is_not_offer_name() {
        let xml = r#"<root><offer><meta><name>inner</name></meta><name>outer</name><price>1</price><param name="Миссия">m</param></offer></root>"#;
        let catalog = reader().read_str("test", xml).unwrap();
        assert_eq!(catalog.offers()[0].name, "outer");
    }

    #[test]
    fn test_duplicate_names() {
        let xml = r#"<root>
            <offer><name>A</name><price>1</price><param name="Миссия">first</param></offer>
            <offer><name>B</name><price>2</price><param name="Миссия">b</param></offer>
            <offer><name>A</name><price>3</price><param name="Миссия">second</param></offer>
        </root>"#;
        let catalog = reader().read_str("test", xml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.offers()[0].name, "A");
        assert_eq!(catalog.offers()[0].price, 3.0);
        assert_eq!(catalog.offers()[0].category, "second");
    }

    #[test]
    fn test_no_offers() {
        let catalog = reader().read_str("test", "<root/>").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed() {
        for xml in [
            "",
            "<root><offer></root>",
            "<root><offer>",
            "<root></root><second/>",
            "<root>text</wrong>",
            "not xml at all",
            "garbage<root/>",
            "<root/>trailing garbage",
            "<root><desc>&bogus;</desc></root>",
            "<root/><![CDATA[late]]>",
        ] {
            let err = reader().read_str("broken.xml", xml).unwrap_err();
            assert!(
                matches!(&err, ForecastError::Malformed { origin, .. } if origin == "broken.xml"),
                "{xml:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let xml = r#"<root><offer><name>A</name><param name="Миссия">m</param></offer></root>"#;
        assert!(matches!(
            reader().read_str("test", xml).unwrap_err(),
            ForecastError::MissingField { index: 0, field: "price" }
        ));

        let xml = r#"<root><offer><name>A</name><price>cheap</price><param name="Миссия">m</param></offer></root>"#;
        assert!(matches!(
            reader().read_str("test", xml).unwrap_err(),
            ForecastError::InvalidPrice { .. }
        ));

        for price in ["NaN", "inf", "-infinity"] {
            let xml = format!(r#"<root><offer><name>A</name><price>{price}</price><param name="Миссия">m</param></offer></root>"#);
            assert!(
                matches!(
                    reader().read_str("test", &xml).unwrap_err(),
                    ForecastError::InvalidPrice { value, .. } if value == price
                ),
                "{price} must be rejected"
            );
        }
    }

    #[test]
    fn test_repeated_fields() {
        let xml = r#"<root><offer>
            <name>A</name><name>B</name>
            <price>1</price><price>2</price>
            <param name="Миссия">first</param><param name="Миссия">second</param>
        </offer></root>"#;
        let catalog = reader().read_str("test", xml).unwrap();
        assert_eq!(
            catalog.offers(),
            &[Offer {
                name:     "A".to_string(),
                price:    1.0,
                category: "first".to_string(),
            }]
        );

        // An empty first element still takes the slot.
        let xml = r#"<root><offer><name/><name>B</name><price>1</price><param name="Миссия">m</param></offer></root>"#;
        assert_eq!(reader().read_str("test", xml).unwrap().offers()[0].name, "");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.xml");
        assert!(matches!(
            reader().read_file(&missing).unwrap_err(),
            ForecastError::FileNotFound { path } if path == missing
        ));

        let path = dir.path().join("catalog.xml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(CATALOG.as_bytes())
            .unwrap();
        assert_eq!(reader().read_file(&path).unwrap().len(), 2);

        let binary = dir.path().join("binary.xml");
        std::fs::write(&binary, b"<root><offer><name>\xff\xfe</name></offer></root>").unwrap();
        assert!(matches!(
            reader().read_file(&binary).unwrap_err(),
            ForecastError::Malformed { .. }
        ));
    }

    // Single-byte Cyrillic code page: А..я map onto 0xC0..0xFF.
    fn cp1251(text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| match c {
                'А'..='я' => (c as u32 - 'А' as u32 + 0xC0) as u8,
                _ => c as u8,
            })
            .collect()
    }

    #[test]
    fn test_read_file_declared_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp1251.xml");
        std::fs::write(
            &path,
            cp1251(concat!(
                r#"<?xml version="1.0" encoding="windows-1251"?>"#,
                r#"<yml_catalog><offers><offer>"#,
                r#"<name>Луноход</name><price>150</price><param name="Миссия">Луна 17</param>"#,
                r#"</offer></offers></yml_catalog>"#,
            )),
        )
        .unwrap();

        let catalog = reader().read_file(&path).unwrap();
        let offer = &catalog.offers()[0];
        assert_eq!(offer.name, "Луноход");
        assert_eq!(offer.price, 150.0);
        assert_eq!(offer.category, "Луна 17");
    }
}
