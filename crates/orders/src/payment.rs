use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use reqwest::Url;

use common::Config;

const UPI_BASE: &str = "upi://pay";

/// Where the money goes
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub payee_id: String,
    pub merchant_name: String,
    pub currency: String,
}

impl From<&Config> for PaymentDetails {
    fn from(config: &Config) -> Self {
        Self {
            payee_id: config.payment.payee_id.clone(),
            merchant_name: config.payment.merchant_name.clone(),
            currency: config.payment.currency.clone(),
        }
    }
}

impl PaymentDetails {
    /// UPI deep link for paying `amount` for the order
    pub fn upi_uri(&self, order_id: &str, amount: u32) -> Option<String> {
        let url = Url::parse_with_params(
            UPI_BASE,
            &[
                ("pa", self.payee_id.as_str()),
                ("pn", self.merchant_name.as_str()),
                ("am", amount.to_string().as_str()),
                ("tn", format!("Order {order_id}").as_str()),
                ("cu", self.currency.as_str()),
            ],
        )
        .inspect_err(|e| log::error!("failed to build upi uri for order {order_id}: {e}"))
        .ok()?;

        // form encoding turns spaces into '+', upi apps expect %20. A literal
        // '+' is already escaped as %2B, so every '+' left is a space
        Some(url.as_str().replace('+', "%20"))
    }
}

/// Turns a payment string into a displayable image
pub trait QrRenderer: Send + Sync {
    /// `None` if image can't be produced
    fn render(&self, data: &str) -> Option<Vec<u8>>;
}

/// PNG renderer
#[derive(Debug, Clone, Copy)]
pub struct PngQr {
    /// Size of one module in pixels
    pub module_px: u32,
}

impl Default for PngQr {
    fn default() -> Self {
        Self { module_px: 10 }
    }
}

impl QrRenderer for PngQr {
    fn render(&self, data: &str) -> Option<Vec<u8>> {
        let code = QrCode::new(data.as_bytes())
            .inspect_err(|e| log::error!("failed to encode qr code: {e}"))
            .ok()?;
        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_px, self.module_px)
            .quiet_zone(true)
            .build();

        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut png, ImageFormat::Png)
            .inspect_err(|e| log::error!("failed to write qr png: {e}"))
            .ok()?;
        Some(png.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn details() -> PaymentDetails {
        PaymentDetails {
            payee_id: "shop@bank".to_string(),
            merchant_name: "Premium Shop".to_string(),
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_upi_uri() {
        let uri = details().upi_uri("ORD1000", 109).unwrap();
        assert_eq!(
            uri,
            "upi://pay?pa=shop%40bank&pn=Premium%20Shop&am=109&tn=Order%20ORD1000&cu=INR"
        );
    }

    #[test]
    fn test_upi_uri_keeps_literal_plus() {
        let mut details = details();
        details.merchant_name = "A+B".to_string();
        let uri = details.upi_uri("ORD1", 1).unwrap();
        assert!(uri.contains("pn=A%2BB"), "{uri}");
    }

    #[test]
    fn test_render_png() {
        let uri = details().upi_uri("ORD1000", 109).unwrap();
        let png = PngQr::default().render(&uri).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_render_too_long() {
        let data = "x".repeat(8000);
        assert!(PngQr::default().render(&data).is_none());
    }
}
