//! View rendering
//!
//! Handlers never build response bodies themselves: they end in an
//! [`Outcome`], and the configured [`ViewRenderer`] turns a rendered view
//! (template name plus data bag) into a body.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppResult;

/// A template name and the data bag handed to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub template: &'static str,
    pub data: Map<String, Value>,
}

impl View {
    /// A view whose bag holds only its `title`
    pub fn new(template: &'static str, title: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("title".to_string(), Value::String(title.into()));
        Self { template, data }
    }

    /// Add one entry to the data bag
    pub fn with(mut self, key: &str, value: impl Serialize) -> AppResult<Self> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }
}

/// Terminal action of a request handler
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(View),
    Redirect(String),
    /// Endpoint exists but has no behavior yet
    NotSupported(String),
}

impl Outcome {
    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Render(view) => Some(view),
            _ => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(url) => Some(url),
            _ => None,
        }
    }
}

/// Turns a view into a response body
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &View) -> AppResult<String>;

    fn content_type(&self) -> &'static str;
}

/// Renders the view as `{"template": ..., "data": {...}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn render(&self, view: &View) -> AppResult<String> {
        Ok(serde_json::to_string(view)?)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

pub const NOT_SUPPORTED_TEMPLATE: &str = "not_supported";

/// Build the HTTP response for an outcome
pub fn respond(renderer: &dyn ViewRenderer, outcome: Outcome) -> AppResult<Response> {
    let (status, view) = match outcome {
        Outcome::Redirect(url) => return Ok(Redirect::to(&url).into_response()),
        Outcome::Render(view) => (StatusCode::OK, view),
        Outcome::NotSupported(what) => (
            StatusCode::NOT_IMPLEMENTED,
            View::new(NOT_SUPPORTED_TEMPLATE, format!("NOT IMPLEMENTED: {}", what)),
        ),
    };

    let body = renderer.render(&view)?;
    Ok((status, [(header::CONTENT_TYPE, renderer.content_type())], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_bag() {
        let view = View::new("genre_list", "Genre List").with("genre_list", vec!["Fantasy"]).unwrap();
        assert_eq!(view.title(), Some("Genre List"));
        assert_eq!(view.get("genre_list"), Some(&serde_json::json!(["Fantasy"])));
    }

    #[test]
    fn test_json_renderer() {
        let view = View::new("index", "Local Library Home");
        let body = JsonRenderer.render(&view).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["template"], "index");
        assert_eq!(value["data"]["title"], "Local Library Home");
    }

    #[test]
    fn test_respond_statuses() {
        let rendered = respond(&JsonRenderer, Outcome::Render(View::new("index", "Home"))).unwrap();
        assert_eq!(rendered.status(), StatusCode::OK);

        let redirected = respond(&JsonRenderer, Outcome::Redirect("/catalog/authors".to_string())).unwrap();
        assert_eq!(redirected.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirected.headers()[header::LOCATION], "/catalog/authors");

        let stub = respond(&JsonRenderer, Outcome::NotSupported("Genre update GET".to_string())).unwrap();
        assert_eq!(stub.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
