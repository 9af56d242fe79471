//! Certificate of translation.

use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::config::Lang;
use crate::error::Result;
use super::layout::PageMetrics;
use super::render::{save_pdf, Align, FontStyle, TextPdfWriter};

/// Title shown at the top of every certificate.
pub const CERTIFICATE_TITLE: &str = "Certificate of Translation";

/// Date format printed under the signer's address.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Signer details and language pair stated on the certificate
#[derive(Debug, Clone)]
pub struct Certificate {
    pub name: String,
    pub address: String,
    pub source: Lang,
    pub target: Lang,
}

/// Format a date the way it appears on the certificate.
pub fn format_certificate_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl Certificate {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        source: Lang,
        target: Lang,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            source,
            target,
        }
    }

    /// The certification sentence.
    pub fn statement(&self) -> String {
        format!(
            "I, {} hereby certify that I am fluent in the {} and {} languages and that the \
             attached translation is a faithful and accurate translation of the enclosed \
             document in the {} language.",
            self.name, self.source, self.target, self.source
        )
    }

    /// Render the certificate dated with today's local date.
    pub fn render(&self) -> Result<Vec<u8>> {
        self.render_dated(Local::now().date_naive())
    }

    /// Render the certificate with an explicit date.
    pub fn render_dated(&self, date: NaiveDate) -> Result<Vec<u8>> {
        let metrics = PageMetrics::default();
        let row_height = metrics.row_height_mm();
        let mut writer = TextPdfWriter::new(metrics).with_title(CERTIFICATE_TITLE);

        writer.set_font(FontStyle::Bold);
        writer.row(CERTIFICATE_TITLE, row_height * 2.0, Align::Center);
        writer.gap(row_height);

        writer.set_font(FontStyle::Regular);
        writer.paragraph(&self.statement());

        writer.blank_row();
        writer.blank_row();

        writer.set_font(FontStyle::Bold);
        writer.paragraph(&self.name);
        writer.gap(row_height * 0.5);

        writer.set_font(FontStyle::Regular);
        writer.paragraph(&self.address);
        writer.gap(row_height * 0.5);

        let date = format_certificate_date(date);
        debug!("Certificate dated {}", date);
        writer.paragraph(&date);

        writer.finish()
    }

    /// Render the certificate and write it to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        info!("Producing certificate of translation");
        let bytes = self.render()?;
        save_pdf(&bytes, path)
    }
}
