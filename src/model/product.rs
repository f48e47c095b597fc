use serde::{Deserialize, Serialize};

/// Descriptions longer than this are shortened by [`Product::short_description`].
const DESCRIPTION_PREVIEW_LIMIT: usize = 50;
/// Characters kept when a description is shortened.
const DESCRIPTION_PREVIEW_KEEP: usize = 40;

/// A product record as the remote collection stores it.
///
/// # Identity
/// `id` is assigned by the remote store on creation, so every `Product` held by the
/// [`store`](crate::store) has one. Not-yet-persisted input is expressed as a
/// [`ProductPatch`] instead.
///
/// # Example
///
/// ```
/// use product_sync::model::Product;
///
/// let widget = Product::new("p1", "Widget", 9.99, 5, true);
/// assert_eq!(widget.id, "p1");
/// assert!(widget.description.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u32,
    pub status: bool,
}

impl Product {
    /// Creates a new Product instance without a description.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the remote store
    /// * `name` - Display name
    /// * `price` - Unit price
    /// * `quantity` - Units in stock
    /// * `status` - `true` when the product is active
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        quantity: u32,
        status: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            quantity,
            status,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description as shown in the product table: long text is cut and suffixed with `...`.
    pub fn short_description(&self) -> Option<String> {
        let description = self.description.as_deref()?;
        if description.chars().count() > DESCRIPTION_PREVIEW_LIMIT {
            let kept: String = description.chars().take(DESCRIPTION_PREVIEW_KEEP).collect();
            Some(format!("{kept}..."))
        } else {
            Some(description.to_string())
        }
    }
}

/// Partial product sent to the gateway on create and update.
///
/// Only the fields that are `Some` are serialized, so an update carrying just
/// `status` leaves every other field untouched on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl ProductPatch {
    /// A full draft, as submitted by the add-product form.
    pub fn new(name: impl Into<String>, price: f64, quantity: u32, status: bool) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            price: Some(price),
            quantity: Some(quantity),
            status: Some(status),
        }
    }

    pub fn status(status: bool) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the fields that are present.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("Name is required".to_string());
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(format!("Invalid price: {price}"));
            }
        }
        Ok(())
    }

    /// Checks a patch meant to create a new product: the name must be present.
    pub fn validate_new(&self) -> Result<(), String> {
        if self.name.is_none() {
            return Err("Name is required".to_string());
        }
        self.validate()
    }
}
