//! HTML projections of widget state.
//!
//! Every function here is a pure projection: same state in, same markup out.
//! Catalog fields are trusted and inserted as-is; user chat text is escaped
//! because it is shown as plain text.

use advisor_core::filter::FilterState;
use advisor_core::selection::SelectionStore;
use advisor_core::types::{Product, Sender, Transcript};

use crate::formatter::format_bot_message;
use crate::locale::Direction;

pub const CHOOSE_CATEGORY: &str = "Choose a Category";
pub const NO_MATCHES: &str = "No products found matching your criteria.";
pub const NO_SELECTION: &str = "No products selected yet.";
pub const MODAL_NO_DESCRIPTION: &str = "No description available for this product.";

pub fn placeholder(message: &str) -> String {
    format!("<div class=\"placeholder-message\">{}</div>", message)
}

/// Escape text destined for an element body.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Grid ────────────────────────────────────────────────────────────────

/// One product card.
pub fn render_card(product: &Product, selected: bool) -> String {
    let selected_class = if selected { " selected" } else { "" };
    let indicator_class = if selected { " visible" } else { "" };
    format!(
        r#"<div class="product-card{selected_class}" data-product-id="{id}">
  <img src="{image}" alt="{name}">
  <div class="product-info">
    <h3>{name}</h3>
    <p class="product-brand">{brand}</p>
    <button class="info-modal-btn" data-details-id="{id}" aria-label="View product details"><span>Details</span></button>
  </div>
  <div class="selection-indicator{indicator_class}"><span class="check">&#10003;</span></div>
</div>"#,
        id = product.id,
        image = product.image,
        name = product.name,
        brand = product.brand,
    )
}

/// Cards for an already filtered list, or the no-match placeholder.
pub fn render_grid(products: &[Product], selection: &SelectionStore) -> String {
    if products.is_empty() {
        return placeholder(NO_MATCHES);
    }
    products
        .iter()
        .map(|p| render_card(p, selection.contains(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Grid for the current filter. Before the first filter event the grid only
/// invites the user to choose a category.
pub fn render_filtered_grid(
    catalog: &[Product],
    filter: &FilterState,
    selection: &SelectionStore,
) -> String {
    if !filter.applied {
        return placeholder(CHOOSE_CATEGORY);
    }
    render_grid(&filter.apply(catalog), selection)
}

// ── Tray ────────────────────────────────────────────────────────────────

pub fn render_tray(selection: &SelectionStore) -> String {
    if selection.is_empty() {
        return placeholder(NO_SELECTION);
    }
    selection
        .products()
        .iter()
        .map(|product| {
            format!(
                r#"<div class="selected-product-item" data-selected-id="{id}">
  <img src="{image}" alt="{name}">
  <div class="selected-product-info">
    <span class="product-name">{name}</span>
    <span class="product-brand">{brand}</span>
  </div>
  <div class="selected-actions">
    <button class="info-btn-small" data-details-id="{id}" title="Details">i</button>
    <button class="remove-btn" data-remove-id="{id}" title="Remove">&times;</button>
  </div>
</div>"#,
                id = product.id,
                image = product.image,
                name = product.name,
                brand = product.brand,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Modal ───────────────────────────────────────────────────────────────

/// Inner content of the details overlay.
pub fn render_modal_content(product: &Product) -> String {
    let description = product
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(MODAL_NO_DESCRIPTION);
    format!(
        r#"<div class="modal-header">
  <h2>{name}</h2>
  <button class="modal-close">&times;</button>
</div>
<div class="modal-body">
  <img src="{image}" alt="{name}" class="modal-image">
  <div class="modal-details">
    <p class="modal-brand"><strong>Brand:</strong> {brand}</p>
    <p class="modal-category"><strong>Category:</strong> {category}</p>
    <div class="modal-description">
      <strong>Description:</strong>
      <p>{description}</p>
    </div>
  </div>
</div>"#,
        name = product.name,
        image = product.image,
        brand = product.brand,
        category = product.category,
        description = description,
    )
}

/// The overlay element itself; hidden when nothing is open.
pub fn render_modal(content: Option<&str>) -> String {
    let display = if content.is_some() { "block" } else { "none" };
    format!(
        r#"<div id="productModal" class="modal" style="display: {}"><div class="modal-content">{}</div></div>"#,
        display,
        content.unwrap_or_default()
    )
}

// ── Transcript ──────────────────────────────────────────────────────────

/// Chat window contents. Bot messages are formatted, user messages are shown
/// verbatim. Each message carries its send time.
pub fn render_transcript(transcript: &Transcript) -> String {
    transcript
        .entries()
        .iter()
        .map(|entry| {
            let (class, body) = match entry.sender {
                Sender::User => ("user", escape_text(&entry.text)),
                Sender::Bot => ("bot", format_bot_message(&entry.text)),
            };
            format!(
                "<div class=\"chat-message {}\" data-time=\"{}\">{}</div>",
                class,
                entry.timestamp.to_rfc3339(),
                body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Page ────────────────────────────────────────────────────────────────

/// Everything needed to render the whole widget document.
pub struct PageView<'a> {
    pub lang: &'a str,
    pub direction: Direction,
    pub categories: &'a [&'a str],
    pub filter: &'a FilterState,
    pub grid: &'a str,
    pub tray: &'a str,
    pub transcript: &'a Transcript,
    /// Modal content when the overlay is showing.
    pub modal: Option<&'a str>,
    /// Whether the overlay element has been created yet.
    pub modal_created: bool,
}

fn render_category_options(categories: &[&str], current: &str) -> String {
    let mut options = vec![format!(
        "<option value=\"\"{}>Choose a Category</option>",
        if current.is_empty() { " selected" } else { "" }
    )];
    for category in categories {
        options.push(format!(
            "<option value=\"{c}\"{sel}>{c}</option>",
            c = category,
            sel = if *category == current { " selected" } else { "" }
        ));
    }
    options.join("")
}

pub fn render_page(view: &PageView<'_>) -> String {
    let body_style = if view.modal.is_some() {
        " style=\"overflow: hidden\""
    } else {
        ""
    };
    let modal = if view.modal_created {
        render_modal(view.modal)
    } else {
        String::new()
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
<meta charset="utf-8">
<title>Routine Advisor</title>
</head>
<body{body_style}>
<div class="search-section">
  <select id="categoryFilter">{options}</select>
  <input id="searchInput" type="text" value="{term}" placeholder="Search products">
</div>
<div id="productsContainer" class="products-grid">
{grid}
</div>
<div class="selected-products">
  <h2>Selected Products</h2>
  <div id="selectedProductsList">
{tray}
  </div>
  <button id="generateRoutine">Generate Routine</button>
</div>
<div id="chatWindow" class="chat-window">
{transcript}
</div>
{modal}
</body>
</html>
"#,
        lang = view.lang,
        dir = view.direction.as_str(),
        body_style = body_style,
        options = render_category_options(view.categories, &view.filter.category),
        term = escape_text(&view.filter.term),
        grid = view.grid,
        tray = view.tray,
        transcript = render_transcript(view.transcript),
        modal = modal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::types::ProductId;

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: ProductId::from(1),
                name: "Clay Mask".into(),
                brand: "X".into(),
                category: "skincare".into(),
                image: "mask.png".into(),
                description: None,
            },
            Product {
                id: ProductId::from(2),
                name: "Shine Serum".into(),
                brand: "Y".into(),
                category: "haircare".into(),
                image: "serum.png".into(),
                description: Some("Glossy finish".into()),
            },
        ]
    }

    #[test]
    fn test_grid_placeholder_before_filtering() {
        let html =
            render_filtered_grid(&catalog(), &FilterState::default(), &SelectionStore::new());
        assert_eq!(html, placeholder(CHOOSE_CATEGORY));
    }

    #[test]
    fn test_grid_no_matches() {
        let filter = FilterState {
            category: "fragrance".into(),
            term: String::new(),
            applied: true,
        };
        let html = render_filtered_grid(&catalog(), &filter, &SelectionStore::new());
        assert!(html.contains(NO_MATCHES));
    }

    #[test]
    fn test_grid_marks_selected_cards() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        selection.toggle("2", &catalog);

        let html = render_grid(&catalog, &selection);
        assert!(html.contains(r#"<div class="product-card" data-product-id="1">"#));
        assert!(html.contains(r#"<div class="product-card selected" data-product-id="2">"#));
        assert_eq!(html.matches("selection-indicator visible").count(), 1);
        assert!(html.contains("<h3>Clay Mask</h3>"));
        assert!(html.contains("data-details-id=\"1\""));
    }

    #[test]
    fn test_grid_is_pure() {
        let catalog = catalog();
        let selection = SelectionStore::new();
        assert_eq!(render_grid(&catalog, &selection), render_grid(&catalog, &selection));
    }

    #[test]
    fn test_tray() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        assert_eq!(render_tray(&selection), placeholder(NO_SELECTION));

        selection.toggle("1", &catalog);
        let html = render_tray(&selection);
        assert!(html.contains("data-selected-id=\"1\""));
        assert!(html.contains("data-remove-id=\"1\""));
        assert!(html.contains("<span class=\"product-name\">Clay Mask</span>"));
    }

    #[test]
    fn test_modal_content_fallback_description() {
        let catalog = catalog();
        let html = render_modal_content(&catalog[0]);
        assert!(html.contains(MODAL_NO_DESCRIPTION));
        assert!(html.contains("<strong>Category:</strong> skincare"));

        let html = render_modal_content(&catalog[1]);
        assert!(html.contains("<p>Glossy finish</p>"));
    }

    #[test]
    fn test_modal_visibility() {
        assert!(render_modal(None).contains("display: none"));
        assert!(render_modal(Some("x")).contains("display: block"));
    }

    #[test]
    fn test_transcript_escapes_user_and_formats_bot() {
        let mut transcript = Transcript::new();
        transcript.push(Sender::User, "<b>hi</b>");
        transcript.push(Sender::Bot, "**Bold** reply");
        let html = render_transcript(&transcript);
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        let sent = transcript.entries()[0].timestamp.to_rfc3339();
        assert!(html.contains(&format!(
            "<div class=\"chat-message user\" data-time=\"{}\">",
            sent
        )));
        assert!(html.contains("<strong>Bold</strong> reply"));
        assert!(html.contains("formatted-response"));
    }

    #[test]
    fn test_page_preselects_category_and_locks_scroll() {
        let filter = FilterState {
            category: "haircare".into(),
            term: String::new(),
            applied: true,
        };
        let transcript = Transcript::new();
        let categories = ["skincare", "haircare"];
        let view = PageView {
            lang: "ar",
            direction: Direction::Rtl,
            categories: &categories,
            filter: &filter,
            grid: "GRID",
            tray: "TRAY",
            transcript: &transcript,
            modal: Some("MODAL"),
            modal_created: true,
        };
        let html = render_page(&view);
        assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
        assert!(html.contains(r#"<option value="haircare" selected>haircare</option>"#));
        assert!(html.contains(r#"<option value="skincare">skincare</option>"#));
        assert!(html.contains("<body style=\"overflow: hidden\">"));
        assert!(html.contains("MODAL"));
    }

    #[test]
    fn test_page_without_modal_has_no_overlay() {
        let filter = FilterState::default();
        let transcript = Transcript::new();
        let view = PageView {
            lang: "en",
            direction: Direction::Ltr,
            categories: &[],
            filter: &filter,
            grid: "",
            tray: "",
            transcript: &transcript,
            modal: None,
            modal_created: false,
        };
        let html = render_page(&view);
        assert!(!html.contains("productModal"));
        assert!(html.contains("<body>"));
    }
}
