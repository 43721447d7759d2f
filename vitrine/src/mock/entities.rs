//! Fixed storefront fixtures.
//!
//! Everything here is hardcoded on purpose. The preview renders the
//! same shop, cart and catalog every time, so two renders of the same
//! component are byte-identical and cache keys stay stable.
use serde_json::{json, Value};

pub fn shop() -> Value {
    json!({
        "name": "Preview Shop",
        "email": "hello@preview.example.com",
        "domain": "preview.example.com",
        "url": "https://preview.example.com",
        "currency": "USD",
        "money_format": "${{amount}}",
        "description": "A preview storefront for component development."
    })
}

pub fn cart() -> Value {
    json!({
        "item_count": 0,
        "total_price": 0,
        "items": []
    })
}

pub fn request() -> Value {
    json!({
        "path": "/",
        "page_type": "index",
        "locale": "en",
        "design_mode": true
    })
}

pub fn product() -> Value {
    product_number(1)
}

/// Sample product. The index varies the title and price so collection
/// grids don't render three identical cards.
pub fn product_number(number: i64) -> Value {
    json!({
        "id": number,
        "title": format!("Sample Product {}", number),
        "handle": format!("sample-product-{}", number),
        "vendor": "Preview Shop",
        "price": 1000 * number + 999,
        "compare_at_price": 1000 * number + 1999,
        "available": true,
        "description": "A sample product used to preview this component.",
        "featured_image": "https://placehold.co/600x600",
        "images": [
            "https://placehold.co/600x600",
            "https://placehold.co/600x601"
        ],
        "url": format!("/products/sample-product-{}", number),
        "variants": [
            {
                "id": number * 10 + 1,
                "title": "Default",
                "price": 1000 * number + 999,
                "available": true
            }
        ]
    })
}

pub fn collection() -> Value {
    json!({
        "id": 1,
        "title": "Featured Collection",
        "handle": "featured-collection",
        "description": "A sample collection used to preview this component.",
        "url": "/collections/featured-collection",
        "products_count": 3,
        "products": [product_number(1), product_number(2), product_number(3)]
    })
}

pub fn collections() -> Value {
    json!([collection()])
}

pub fn menus() -> Value {
    json!({
        "main_menu": {
            "title": "Main menu",
            "links": [
                {"title": "Home", "url": "/"},
                {"title": "Catalog", "url": "/collections/all"},
                {"title": "About", "url": "/pages/about"},
                {"title": "Contact", "url": "/pages/contact"}
            ]
        },
        "footer_menu": {
            "title": "Footer menu",
            "links": [
                {"title": "Search", "url": "/search"},
                {"title": "Privacy policy", "url": "/policies/privacy-policy"},
                {"title": "Terms of service", "url": "/policies/terms-of-service"}
            ]
        }
    })
}

pub fn routes() -> Value {
    json!({
        "root_url": "/",
        "cart_url": "/cart",
        "search_url": "/search",
        "account_url": "/account",
        "all_products_collection_url": "/collections/all"
    })
}
