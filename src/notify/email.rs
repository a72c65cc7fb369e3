use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rust_decimal::Decimal;
use tracing::info;

use super::{NotificationSink, format_inr};
use crate::config::SmtpConfig;
use crate::detector::Direction;
use crate::models::Product;
use crate::utils::error::Result;

const NO_CHANGES_SUBJECT: &str = "📊 Price Tracker: No Price Changes";
const NO_CHANGES_BODY: &str = "All product prices remain the same.";

/// SMTP-backed sink. Every message goes out as multipart alternative so
/// plain-text clients stay readable.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Builds a notifier from SMTP settings, or `None` when credentials or
    /// addresses are missing and the caller should fall back to log-only
    /// alerts.
    pub fn from_config(config: &SmtpConfig) -> Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }
        let (Some(username), Some(password), Some(from_address), Some(to_address)) = (
            config.username.as_ref(),
            config.password.as_ref(),
            config.from_address.as_ref(),
            config.to_address.as_ref(),
        ) else {
            return Ok(None);
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, from_address).parse()?;
        let to: Mailbox = to_address.parse()?;

        let credentials = Credentials::new(username.clone(), password.clone());
        let mailer = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port)
        .credentials(credentials)
        .build();

        Ok(Some(EmailNotifier { mailer, from, to }))
    }

    fn format_alert_subject(&self, product: &Product, direction: Direction) -> String {
        format!("📉 Price Alert: {} ({})", product.name, direction)
    }

    fn format_alert_text(&self, product: &Product, old_price: Decimal, direction: Direction) -> String {
        let mut text = String::new();
        text.push_str(&format!("Price {} for {}\n\n", direction, product.name));
        text.push_str(&format!(
            "Price: {} → {}\n",
            format_inr(old_price),
            format_inr(product.price)
        ));
        text.push_str(&format!("Platform: {}\n", product.platform));
        text.push_str(&format!("Link: {}\n", product.url));
        text
    }

    fn format_alert_html(&self, product: &Product, old_price: Decimal, direction: Direction) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; margin: 20px;">
    <h2>{name}</h2>
    <p>The price has {direction}:</p>
    <p style="font-size: 18px;"><del>{old}</del> → <strong>{new}</strong></p>
    <p>Platform: {platform}</p>
    <p><a href="{url}">View product</a></p>
</body>
</html>
"#,
            name = product.name,
            direction = direction,
            old = format_inr(old_price),
            new = format_inr(product.price),
            platform = product.platform,
            url = product.url,
        )
    }

    async fn deliver(&self, subject: String, text_body: String, html_body: String) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for EmailNotifier {
    async fn send_price_change(
        &self,
        product: &Product,
        old_price: Decimal,
        direction: Direction,
    ) -> Result<()> {
        let subject = self.format_alert_subject(product, direction);
        let text = self.format_alert_text(product, old_price, direction);
        let html = self.format_alert_html(product, old_price, direction);

        self.deliver(subject, text, html).await?;
        info!(url = %product.url, %direction, "price alert e-mail sent");
        Ok(())
    }

    async fn send_no_changes_summary(&self) -> Result<()> {
        let html = format!("<p>{}</p>", NO_CHANGES_BODY);
        self.deliver(NO_CHANGES_SUBJECT.to_string(), NO_CHANGES_BODY.to_string(), html)
            .await?;
        info!("no-change summary e-mail sent");
        Ok(())
    }
}
