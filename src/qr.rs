//! QR codes for share links.
//!
//! Share links embed every asset, so most galleries with real images are far
//! beyond what a QR symbol can hold (a version 40 code stores about 1.2 KB at
//! level H). Those fail with [`QrError::Encode`]; short links, e.g. galleries
//! whose assets stayed as URLs, render fine.

use crate::config::{ErrorCorrection, QrConfig};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("QR generation failed: {0}")]
    Encode(String),
}

fn ec_level(level: ErrorCorrection) -> EcLevel {
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

/// Render `url` as an SVG document.
pub fn render_svg(url: &str, config: &QrConfig) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), ec_level(config.error_correction))
        .map_err(|e| QrError::Encode(e.to_string()))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(config.size, config.size)
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_short_link() {
        let svg = render_svg("http://localhost:8080?gallery=Q", &QrConfig::default()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn oversized_link_is_an_error() {
        let url = format!("http://localhost:8080?gallery={}", "A".repeat(4000));
        assert!(matches!(
            render_svg(&url, &QrConfig::default()),
            Err(QrError::Encode(_))
        ));
    }

    #[test]
    fn lower_correction_holds_more_data() {
        let url = format!("http://localhost:8080?gallery={}", "x".repeat(1500));
        let high = QrConfig::default();
        let low = QrConfig {
            error_correction: ErrorCorrection::L,
            ..QrConfig::default()
        };
        assert!(render_svg(&url, &high).is_err());
        assert!(render_svg(&url, &low).is_ok());
    }
}
