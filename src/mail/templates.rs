use anyhow::{Context, Result};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates/mail"]
struct Templates;

pub const ACTIVATION: &str = "activation.html";
pub const RESET_PASSWORD: &str = "reset_password.html";

/// Embedded HTML mail templates with `{{name}}` placeholders.
#[derive(Debug, Clone)]
pub struct MailTemplates {
    activation: String,
    reset_password: String,
}

impl MailTemplates {
    /// Loads and checks every template once at startup.
    pub fn load() -> Result<Self> {
        Ok(Self {
            activation: load(ACTIVATION)?,
            reset_password: load(RESET_PASSWORD)?,
        })
    }

    #[must_use]
    pub fn activation(&self, url: &str, otp: &str) -> String {
        render(&self.activation, &[("url", url), ("otp", otp)])
    }

    #[must_use]
    pub fn reset_password(&self, url: &str, otp: &str) -> String {
        render(&self.reset_password, &[("url", url), ("otp", otp)])
    }
}

fn load(name: &str) -> Result<String> {
    let file = Templates::get(name).with_context(|| format!("Missing mail template {name}"))?;
    String::from_utf8(file.data.into_owned())
        .with_context(|| format!("Mail template {name} is not UTF-8"))
}

/// Substitutes placeholders; values are escaped for HTML attribute context.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        let escaped = html_escape::encode_double_quoted_attribute(value);
        acc.replace(&format!("{{{{{key}}}}}"), &escaped)
    })
}
