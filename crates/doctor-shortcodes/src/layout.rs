//! Table-of-contents layout step.

use std::fmt;

use doctor_markup::Document;

/// Class of the page container.
pub const CONTAINER_CLASS: &str = "doctor__container";
/// Class of the table-of-contents container.
pub const TOC_CLASS: &str = "doctor__container__toc";
/// Class of the markdown body inside the page container.
pub const MARKDOWN_CLASS: &str = "doctor__container__markdown";

/// Side of the page the table of contents is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocPosition {
    /// Left of the markdown body.
    Left,
    /// Right of the markdown body.
    Right,
}

impl TocPosition {
    /// Parse a `position` attribute value, ignoring case.
    ///
    /// Any value other than `left` or `right` yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if value.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// Lowercase position name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Modifier class added to the markdown body.
    #[must_use]
    pub fn padding_class(self) -> String {
        format!("{MARKDOWN_CLASS}_{}_padding", self.as_str())
    }
}

impl fmt::Display for TocPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move the table of contents to the front of the page containers and pad
/// the markdown bodies on `position`'s side.
///
/// Every [`TOC_CLASS`] element becomes a leading child of every
/// [`CONTAINER_CLASS`] element, in document order: earlier containers get
/// copies and the last container receives the elements themselves. Every
/// [`MARKDOWN_CLASS`] element inside a container gets the padding class,
/// whether or not a table of contents exists.
///
/// With a single container, re-applying the same position changes nothing.
/// Applying a different position adds a second padding class next to the
/// first one.
///
/// Returns `false` when there is no container, in which case the document
/// is left untouched.
pub fn apply_toc_position(doc: &mut Document, position: TocPosition) -> bool {
    let containers = doc.elements_by_class(CONTAINER_CLASS);
    let Some((&last, earlier)) = containers.split_last() else {
        tracing::debug!(%position, "No page container, skipping TOC layout");
        return false;
    };
    let tocs = doc.elements_by_class(TOC_CLASS);

    for &container in earlier {
        for &toc in tocs.iter().rev() {
            let copy = doc.deep_clone(toc);
            doc.prepend_child(container, copy);
        }
    }
    for &toc in tocs.iter().rev() {
        doc.prepend_child(last, toc);
    }

    let padding = position.padding_class();
    for &container in &containers {
        for body in doc.descendants_by_class(container, MARKDOWN_CLASS) {
            doc.add_class(body, &padding);
        }
    }

    tracing::debug!(
        %position,
        containers = containers.len(),
        tocs = tocs.len(),
        "Applied TOC layout"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = concat!(
        r#"<div class="doctor__container">"#,
        r#"<div class="doctor__container__markdown"><h1>T</h1>"#,
        r#"<div class="doctor__container__toc"><nav></nav></div>"#,
        "</div></div>"
    );

    #[test]
    fn test_parse_position() {
        assert_eq!(TocPosition::parse("Right"), Some(TocPosition::Right));
        assert_eq!(TocPosition::parse("LEFT"), Some(TocPosition::Left));
        assert_eq!(TocPosition::parse("center"), None);
        assert_eq!(TocPosition::parse(""), None);
    }

    #[test]
    fn test_apply_moves_toc_and_pads_body() {
        let mut doc = Document::parse(PAGE);
        assert!(apply_toc_position(&mut doc, TocPosition::Right));
        assert_eq!(
            doc.to_markup(),
            concat!(
                r#"<div class="doctor__container">"#,
                r#"<div class="doctor__container__toc"><nav></nav></div>"#,
                r#"<div class="doctor__container__markdown doctor__container__markdown_right_padding"><h1>T</h1></div>"#,
                "</div>"
            )
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut doc = Document::parse(PAGE);
        apply_toc_position(&mut doc, TocPosition::Left);
        let once = doc.to_markup();
        apply_toc_position(&mut doc, TocPosition::Left);
        assert_eq!(doc.to_markup(), once);
    }

    #[test]
    fn test_different_positions_accumulate_classes() {
        // Known sharp edge: a second position does not replace the first.
        let mut doc = Document::parse(PAGE);
        apply_toc_position(&mut doc, TocPosition::Left);
        apply_toc_position(&mut doc, TocPosition::Right);

        let body = doc.elements_by_class(MARKDOWN_CLASS)[0];
        let element = doc.element(body).unwrap();
        assert!(element.has_class("doctor__container__markdown_left_padding"));
        assert!(element.has_class("doctor__container__markdown_right_padding"));
    }

    #[test]
    fn test_body_padded_without_toc() {
        let mut doc = Document::parse(concat!(
            r#"<div class="doctor__container">"#,
            r#"<div class="doctor__container__markdown"><h1>T</h1></div>"#,
            "</div>"
        ));
        assert!(apply_toc_position(&mut doc, TocPosition::Right));

        let body = doc.elements_by_class(MARKDOWN_CLASS)[0];
        assert!(
            doc.element(body)
                .unwrap()
                .has_class("doctor__container__markdown_right_padding")
        );
        assert!(doc.elements_by_class(TOC_CLASS).is_empty());
    }

    #[test]
    fn test_every_container_gets_toc_and_padding() {
        let mut doc = Document::parse(concat!(
            r#"<div class="doctor__container"><div class="doctor__container__markdown">a</div></div>"#,
            r#"<div class="doctor__container"><div class="doctor__container__markdown">b"#,
            r#"<div class="doctor__container__toc"><nav></nav></div>"#,
            "</div></div>"
        ));
        assert!(apply_toc_position(&mut doc, TocPosition::Left));
        assert_eq!(
            doc.to_markup(),
            concat!(
                r#"<div class="doctor__container">"#,
                r#"<div class="doctor__container__toc"><nav></nav></div>"#,
                r#"<div class="doctor__container__markdown doctor__container__markdown_left_padding">a</div>"#,
                "</div>",
                r#"<div class="doctor__container">"#,
                r#"<div class="doctor__container__toc"><nav></nav></div>"#,
                r#"<div class="doctor__container__markdown doctor__container__markdown_left_padding">b</div>"#,
                "</div>"
            )
        );
    }

    #[test]
    fn test_missing_container_is_noop() {
        let markup = r#"<div class="doctor__container__toc"></div>"#;
        let mut doc = Document::parse(markup);
        assert!(!apply_toc_position(&mut doc, TocPosition::Left));
        assert_eq!(doc.to_markup(), markup);
    }
}
