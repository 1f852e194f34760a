//! Admin list columns
//!
//! [`register_columns`] places the three inline columns; [`ColumnRenderer`]
//! fills one cell per column per row.

use crate::authz::AuthorizationService;
use crate::error::StoreError;
use crate::session::Session;
use crate::store::AttachmentStore;
use crate::token::CsrfIssuer;
use ml_inline_model::{AttachmentId, ControlDescriptor, ControlKind, FieldName};
use std::sync::Arc;

/// Markup shown in place of a control
pub const PLACEHOLDER_HTML: &str = "<em>—</em>";

/// Insert the inline columns right after `title`, or at the end when there is
/// no `title` column. Existing inline columns are repositioned, not doubled.
#[must_use]
pub fn register_columns(existing: &[(String, String)]) -> Vec<(String, String)> {
    let ours = || {
        FieldName::ALL
            .into_iter()
            .map(|f| (f.column_key().to_string(), f.column_label().to_string()))
    };

    let mut out = Vec::with_capacity(existing.len() + FieldName::ALL.len());
    let mut placed = false;
    for (key, label) in existing {
        if FieldName::from_column_key(key).is_some() {
            continue;
        }
        out.push((key.clone(), label.clone()));
        if key == "title" && !placed {
            out.extend(ours());
            placed = true;
        }
    }
    if !placed {
        out.extend(ours());
    }
    out
}

/// Content of one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedCell {
    /// Not one of our columns, or the record vanished
    Skip,
    /// Not editable by this viewer or not an image
    Placeholder,
    Editable(ControlDescriptor),
}

impl RenderedCell {
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Skip => String::new(),
            Self::Placeholder => PLACEHOLDER_HTML.to_string(),
            Self::Editable(control) => control_html(control),
        }
    }
}

/// Renders pre-authorized, pre-populated controls
pub struct ColumnRenderer {
    store: Arc<dyn AttachmentStore>,
    authz: Arc<dyn AuthorizationService>,
    issuer: Arc<CsrfIssuer>,
}

impl ColumnRenderer {
    pub fn new(
        store: Arc<dyn AttachmentStore>,
        authz: Arc<dyn AuthorizationService>,
        issuer: Arc<CsrfIssuer>,
    ) -> Self {
        Self {
            store,
            authz,
            issuer,
        }
    }

    /// Cell for `column_key` in the row of `id`
    pub async fn render(
        &self,
        column_key: &str,
        id: AttachmentId,
        session: &Session,
    ) -> Result<RenderedCell, StoreError> {
        let Some(field) = FieldName::from_column_key(column_key) else {
            return Ok(RenderedCell::Skip);
        };

        if !self.authz.can_edit(&session.actor, id).await {
            return Ok(RenderedCell::Placeholder);
        }

        let Some(record) = self.store.fetch(id).await? else {
            return Ok(RenderedCell::Skip);
        };
        if !record.is_editable_image() {
            return Ok(RenderedCell::Placeholder);
        }

        Ok(RenderedCell::Editable(ControlDescriptor {
            attachment_id: id,
            token: self.issuer.mint(session, id).into_string(),
            field,
            value: record.value_of(field).to_string(),
        }))
    }

    /// All three inline cells of one row, in column order
    pub async fn render_row(
        &self,
        id: AttachmentId,
        session: &Session,
    ) -> Result<Vec<(&'static str, RenderedCell)>, StoreError> {
        let mut cells = Vec::with_capacity(FieldName::ALL.len());
        for field in FieldName::ALL {
            let key = field.column_key();
            cells.push((key, self.render(key, id, session).await?));
        }
        Ok(cells)
    }
}

impl std::fmt::Debug for ColumnRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnRenderer").finish_non_exhaustive()
    }
}

fn control_html(control: &ControlDescriptor) -> String {
    let common = format!(
        r#"data-attach-id="{}" data-nonce="{}" class="ml-inline-field""#,
        control.attachment_id,
        escape_html(&control.token),
    );
    let status = r#"<span class="ml-inline-status"></span>"#;

    match control.kind() {
        ControlKind::SingleLine => format!(
            r#"<input type="text" {common} data-field="{}" value="{}" placeholder="{}" />{status}"#,
            control.field,
            escape_html(&control.value),
            control.placeholder(),
        ),
        ControlKind::MultiLine { rows } => format!(
            r#"<textarea {common} data-field="{}" rows="{rows}" placeholder="{}">{}</textarea>{status}"#,
            control.field,
            control.placeholder(),
            escape_html(&control.value),
        ),
    }
}

/// Escape for attribute values and element text
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cols(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter().map(|k| (k.to_string(), k.to_uppercase())).collect()
    }

    fn keys(cols: &[(String, String)]) -> Vec<&str> {
        cols.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn columns_follow_title() {
        let out = register_columns(&cols(&["cb", "title", "author", "date"]));
        assert_eq!(
            keys(&out),
            vec![
                "cb",
                "title",
                "ml_inline_alt",
                "ml_inline_title",
                "ml_inline_desc",
                "author",
                "date"
            ]
        );
        assert_eq!(out[2].1, "Alt Text");
    }

    #[test]
    fn columns_append_without_title() {
        let out = register_columns(&cols(&["cb", "date"]));
        assert_eq!(
            keys(&out),
            vec!["cb", "date", "ml_inline_alt", "ml_inline_title", "ml_inline_desc"]
        );
    }

    #[test]
    fn registration_is_idempotent() {
        let once = register_columns(&cols(&["title", "date"]));
        assert_eq!(register_columns(&once), once);
    }

    #[test]
    fn single_line_markup() {
        let control = ControlDescriptor {
            attachment_id: AttachmentId::new(5).unwrap(),
            token: "abc".into(),
            field: FieldName::AltText,
            value: r#"Barn "red" & <old>"#.into(),
        };
        assert_eq!(
            RenderedCell::Editable(control).to_html(),
            concat!(
                r#"<input type="text" data-attach-id="5" data-nonce="abc" class="ml-inline-field" "#,
                r#"data-field="altText" value="Barn &quot;red&quot; &amp; &lt;old&gt;" "#,
                r#"placeholder="Describe this image..." />"#,
                r#"<span class="ml-inline-status"></span>"#
            )
        );
    }

    #[test]
    fn multi_line_markup() {
        let control = ControlDescriptor {
            attachment_id: AttachmentId::new(5).unwrap(),
            token: "abc".into(),
            field: FieldName::Description,
            value: "<p>x</p>".into(),
        };
        assert_eq!(
            RenderedCell::Editable(control).to_html(),
            concat!(
                r#"<textarea data-attach-id="5" data-nonce="abc" class="ml-inline-field" "#,
                r#"data-field="description" rows="3" placeholder="Image description...">"#,
                r#"&lt;p&gt;x&lt;/p&gt;</textarea><span class="ml-inline-status"></span>"#
            )
        );
    }

    #[test]
    fn placeholder_and_skip_markup() {
        assert_eq!(RenderedCell::Placeholder.to_html(), "<em>—</em>");
        assert_eq!(RenderedCell::Skip.to_html(), "");
    }
}
