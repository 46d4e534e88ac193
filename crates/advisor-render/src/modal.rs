//! The singleton product-details overlay.

use advisor_core::types::Product;

use crate::html::render_modal_content;

/// Where a click on the overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClick {
    /// The dimmed area around the content.
    Backdrop,
    /// Inside the content box.
    Content,
}

/// Overlay state. The element is created on first open and reused after.
#[derive(Debug, Clone, Default)]
pub struct Modal {
    created: bool,
    open_id: Option<String>,
    content: String,
}

impl Modal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show details for `product`, creating the overlay if needed. Page
    /// scrolling is locked while it is open.
    pub fn open(&mut self, product: &Product) {
        self.created = true;
        self.open_id = Some(product.id.to_string());
        self.content = render_modal_content(product);
    }

    /// Hide the overlay and restore scrolling. No-op if never created.
    pub fn close(&mut self) {
        if self.created {
            self.open_id = None;
        }
    }

    /// Clicks on the backdrop dismiss; clicks inside the content do not.
    pub fn click(&mut self, target: ModalClick) {
        if target == ModalClick::Backdrop {
            self.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_id.is_some()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Id of the product currently shown.
    pub fn open_id(&self) -> Option<&str> {
        self.open_id.as_deref()
    }

    /// Content while open.
    pub fn content(&self) -> Option<&str> {
        self.open_id.as_ref().map(|_| self.content.as_str())
    }

    pub fn scroll_locked(&self) -> bool {
        self.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::types::ProductId;

    fn product() -> Product {
        Product {
            id: ProductId::from(3),
            name: "Night Cream".into(),
            brand: "Revitalift".into(),
            category: "skincare".into(),
            image: "cream.png".into(),
            description: None,
        }
    }

    #[test]
    fn test_created_on_first_open_and_reused() {
        let mut modal = Modal::new();
        assert!(!modal.is_created());
        modal.close();
        assert!(!modal.is_created());

        modal.open(&product());
        assert!(modal.is_created());
        assert!(modal.scroll_locked());
        assert_eq!(modal.open_id(), Some("3"));
        assert!(modal.content().unwrap().contains("Night Cream"));

        modal.close();
        assert!(modal.is_created());
        assert!(!modal.scroll_locked());
        assert!(modal.content().is_none());
    }

    #[test]
    fn test_backdrop_click_dismisses_content_click_does_not() {
        let mut modal = Modal::new();
        modal.open(&product());
        modal.click(ModalClick::Content);
        assert!(modal.is_open());
        modal.click(ModalClick::Backdrop);
        assert!(!modal.is_open());
    }
}
