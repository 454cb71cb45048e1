// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Live properties: values computed from the entry itself rather than
//! kept in a property store.

use crate::data::PropertyValue;
use crate::error::{Error, Result};
use crate::name::PropertyName;
use chrono::{DateTime, Utc};
use davfs::Entry;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `{DAV:}getlastmodified`, backed by the modification time the entry's
/// file system keeps. The value is an RFC 1123 date string.
#[derive(Debug, Clone)]
pub struct LastModifiedProperty {
    entry: Entry,
}

impl LastModifiedProperty {
    #[must_use]
    pub fn new(entry: Entry) -> Self {
        Self { entry }
    }

    #[must_use]
    pub fn property_name() -> PropertyName {
        PropertyName::dav("getlastmodified")
    }

    #[must_use]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub async fn get(&self) -> Result<DateTime<Utc>> {
        Ok(DateTime::<Utc>::from(self.entry.modified().await?))
    }

    /// Stores a new modification time. Read-only entries and lock conflicts
    /// are reported by the file system.
    pub async fn set(&self, time: DateTime<Utc>) -> Result<()> {
        Ok(self.entry.set_modified(time.into()).await?)
    }

    pub async fn get_value(&self) -> Result<PropertyValue> {
        Ok(PropertyValue::from(format_http_date(&self.get().await?)))
    }

    pub async fn set_value(&self, value: &PropertyValue) -> Result<()> {
        let text = value
            .as_str()
            .ok_or_else(|| Error::InvalidDate(value.to_string()))?;
        self.set(parse_http_date(text)?).await
    }
}

#[must_use]
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text.trim())
        .map(|time| time.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use davfs::memory::new_fs;

    const SAMPLE: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

    #[test]
    fn test_http_date_round_trip() {
        let time = parse_http_date(SAMPLE).unwrap();
        assert_eq!(time.timestamp(), 784_111_777);
        assert_eq!(format_http_date(&time), SAMPLE);
        assert!(matches!(
            parse_http_date("yesterday"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_and_writes_backend_time() {
        let fs = new_fs();
        let doc = fs.root().create_document("f").await.unwrap();
        let prop = LastModifiedProperty::new(Entry::from(doc.clone()));

        prop.set_value(&PropertyValue::from(SAMPLE)).await.unwrap();
        assert_eq!(prop.get_value().await.unwrap(), PropertyValue::from(SAMPLE));
        assert_eq!(
            DateTime::<Utc>::from(doc.modified().await.unwrap()),
            parse_http_date(SAMPLE).unwrap()
        );

        doc.write_all(b"changed").await.unwrap();
        assert!(prop.get().await.unwrap() > parse_http_date(SAMPLE).unwrap());

        assert!(matches!(
            prop.set_value(&PropertyValue::from(42)).await,
            Err(Error::InvalidDate(_))
        ));
        fs.set_read_only(true);
        assert!(matches!(
            prop.set_value(&PropertyValue::from(SAMPLE)).await,
            Err(Error::Fs(davfs::Error::UnauthorizedAccess(_)))
        ));
    }
}
