//! Cart request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    carts::models::{Cart, CartLine, CartLineKind, CustomDesign, DesignTransform},
    coupons::models::AppliedCoupon,
};

/// Cart line type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LineType {
    /// A catalog product
    Item,

    /// A collection, expanded into products at checkout
    Collection,

    /// A blank product printed with an uploaded design
    CustomDesign,

    /// A product offered as a suggestion
    SuggestedItem,
}

impl From<CartLineKind> for LineType {
    fn from(kind: CartLineKind) -> Self {
        match kind {
            CartLineKind::Item => Self::Item,
            CartLineKind::Collection => Self::Collection,
            CartLineKind::CustomDesign => Self::CustomDesign,
            CartLineKind::SuggestedItem => Self::SuggestedItem,
        }
    }
}

/// Custom design placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomDesignPayload {
    /// Rendered design image
    pub design_image_url: String,

    /// Image as uploaded
    #[serde(default)]
    pub original_image_url: Option<String>,

    /// Phone model the design was laid out for
    #[serde(default)]
    pub phone_model: Option<String>,

    /// Horizontal offset
    #[serde(default)]
    pub x: f64,

    /// Vertical offset
    #[serde(default)]
    pub y: f64,

    /// Scale factor
    #[serde(default = "unit_scale")]
    pub scale: f64,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl From<CustomDesignPayload> for CustomDesign {
    fn from(payload: CustomDesignPayload) -> Self {
        CustomDesign {
            design_image_url: payload.design_image_url,
            original_image_url: payload.original_image_url,
            phone_model: payload.phone_model,
            transform: DesignTransform {
                x: payload.x,
                y: payload.y,
                scale: payload.scale,
                rotation: payload.rotation,
            },
        }
    }
}

impl From<&CustomDesign> for CustomDesignPayload {
    fn from(design: &CustomDesign) -> Self {
        Self {
            design_image_url: design.design_image_url.clone(),
            original_image_url: design.original_image_url.clone(),
            phone_model: design.phone_model.clone(),
            x: design.transform.x,
            y: design.transform.y,
            scale: design.transform.scale,
            rotation: design.transform.rotation,
        }
    }
}

/// Applied Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AppliedCouponResponse {
    /// Coupon code
    pub code: String,

    /// Percentage taken off the subtotal it was applied to
    pub discount_percentage: u8,

    /// Discount frozen when the coupon was applied
    pub discount_amount: u64,
}

impl From<AppliedCoupon> for AppliedCouponResponse {
    fn from(coupon: AppliedCoupon) -> Self {
        Self {
            code: coupon.code,
            discount_percentage: coupon.discount_percentage,
            discount_amount: coupon.discount_amount,
        }
    }
}

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    /// Line UUID
    pub uuid: Uuid,

    /// What the line refers to
    pub line_type: LineType,

    /// Product or collection UUID
    pub reference: Uuid,

    /// Display name at the time the line was priced
    pub name: String,

    /// Display image
    pub image: Option<String>,

    /// Number of units
    pub quantity: u32,

    /// Price per unit in minor units
    pub unit_price: u64,

    /// `unit_price * quantity`
    pub line_total: u64,

    /// Selected brand
    pub brand: Option<String>,

    /// Selected model
    pub model: Option<String>,

    /// Design for custom lines
    pub custom_design: Option<CustomDesignPayload>,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            uuid: line.uuid.into_uuid(),
            line_type: line.item.kind().into(),
            reference: line.item.reference(),
            custom_design: line.item.design().map(CustomDesignPayload::from),
            line_total: line.line_total(),
            name: line.name,
            image: line.image,
            quantity: line.quantity,
            unit_price: line.unit_price,
            brand: line.variant.brand,
            model: line.variant.model,
        }
    }
}

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Buyer key the cart belongs to
    pub key: String,

    /// Lines in the order they were added
    pub lines: Vec<CartLineResponse>,

    /// Applied coupons
    pub coupons: Vec<AppliedCouponResponse>,

    /// Sum of line totals
    pub subtotal: u64,

    /// Sum of frozen coupon discounts
    pub discount_total: u64,

    /// Number of units across all lines
    pub item_count: u64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let subtotal = cart.subtotal();
        let discount_total = cart.discount_total();
        let item_count = cart.item_count();

        Self {
            key: cart.key,
            lines: cart.lines.into_iter().map(CartLineResponse::from).collect(),
            coupons: cart
                .coupons
                .into_iter()
                .map(AppliedCouponResponse::from)
                .collect(),
            subtotal,
            discount_total,
            item_count,
        }
    }
}
