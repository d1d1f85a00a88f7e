//! TwiML responses
//!
//! Minimal builder for the verbs the ordering flow uses: `<Say>`, `<Play>`,
//! `<Gather>` (speech input) and `<Hangup>`.

use axum::http::header;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verb {
    Say { text: String, language: String },
    Play { url: String },
    Gather {
        action: String,
        language: String,
        timeout_secs: u32,
        inner: Vec<Verb>,
    },
    Hangup,
}

/// A `<Response>` document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwimlResponse {
    verbs: Vec<Verb>,
}

impl TwimlResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>, language: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            text: text.into(),
            language: language.into(),
        });
        self
    }

    pub fn play(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Play { url: url.into() });
        self
    }

    /// Collect speech and POST it to `action`; `inner` is spoken while listening
    pub fn gather(
        mut self,
        action: impl Into<String>,
        language: impl Into<String>,
        timeout_secs: u32,
        inner: TwimlResponse,
    ) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.into(),
            language: language.into(),
            timeout_secs,
            inner: inner.verbs,
        });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        if self.verbs.is_empty() {
            out.push_str("<Response/>");
            return out;
        }
        out.push_str("<Response>");
        for verb in &self.verbs {
            write_verb(&mut out, verb);
        }
        out.push_str("</Response>");
        out
    }
}

fn write_verb(out: &mut String, verb: &Verb) {
    match verb {
        Verb::Say { text, language } => {
            out.push_str(&format!(
                r#"<Say language="{}">{}</Say>"#,
                escape(language),
                escape(text)
            ));
        }
        Verb::Play { url } => {
            out.push_str(&format!("<Play>{}</Play>", escape(url)));
        }
        Verb::Gather {
            action,
            language,
            timeout_secs,
            inner,
        } => {
            out.push_str(&format!(
                r#"<Gather input="speech" action="{}" method="POST" language="{}" timeout="{}" speechTimeout="auto">"#,
                escape(action),
                escape(language),
                timeout_secs
            ));
            for verb in inner {
                write_verb(out, verb);
            }
            out.push_str("</Gather>");
        }
        Verb::Hangup => out.push_str("<Hangup/>"),
    }
}

/// Escape text for XML content and attribute values
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl IntoResponse for TwimlResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/xml")], self.render()).into_response()
    }
}
