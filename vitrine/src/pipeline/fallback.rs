//! Scaffolded templates for components without a stored one.
//!
//! Each category gets a dedicated structural template built from the
//! settings and block types the schema declares, plus a fixed companion
//! stylesheet. The output is intentionally plain: it exists so a
//! schema-only component still previews as something recognizable.
use crate::schema::{Category, ComponentSchema, Setting};

/// Generate a template for a component that has no stored one.
pub fn template(schema: &ComponentSchema) -> String {
    match schema.category {
        Category::Hero => hero(schema),
        Category::Product => product(schema),
        Category::Collection => collection(schema),
        Category::Header => header(schema),
        Category::Footer => footer(schema),
        Category::Text | Category::Other => generic(schema),
    }
}

/// Fixed per-category companion stylesheet.
pub fn stylesheet(category: Category) -> String {
    let css = match category {
        Category::Hero => {
            ".section--hero { padding: 96px 24px; text-align: center; }\n\
             .section--hero h1 { font-size: 2.5rem; margin: 0 0 16px; }\n\
             .section--hero .cta { display: inline-block; padding: 12px 28px; }"
        }
        Category::Product => {
            ".section--product { display: flex; gap: 32px; padding: 48px 24px; }\n\
             .section--product img { max-width: 480px; }\n\
             .section--product .price { font-weight: 600; }"
        }
        Category::Collection => {
            ".section--collection { padding: 48px 24px; }\n\
             .section--collection .grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 24px; }\n\
             .section--collection .card img { width: 100%; }"
        }
        Category::Header => {
            ".section--header { display: flex; justify-content: space-between; padding: 16px 24px; }\n\
             .section--header nav a { margin-left: 24px; text-decoration: none; }"
        }
        Category::Footer => {
            ".section--footer { padding: 48px 24px; }\n\
             .section--footer nav a { display: block; margin-bottom: 8px; }"
        }
        Category::Text | Category::Other => {
            ".section--generic { padding: 48px 24px; max-width: 720px; margin: 0 auto; }"
        }
    };

    css.to_string()
}

fn hero(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "hero");

    let mut text_settings = text_settings(&schema.settings);
    if let Some(heading) = text_settings.next() {
        out.push_str(&format!("  <h1>{{{{ section.settings.{} }}}}</h1>\n", heading.id));
    }
    for setting in text_settings {
        out.push_str(&format!("  <p>{{{{ section.settings.{} }}}}</p>\n", setting.id));
    }

    out.push_str("  <a class=\"cta\" href=\"/collections/all\">Shop now</a>\n");
    out.push_str(&blocks_loop(schema));
    out.push_str("</section>\n");
    out
}

fn product(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "product");

    out.push_str("  {{ product.featured_image | image_tag: product.title }}\n");
    out.push_str("  <div>\n");
    out.push_str("    <h2>{{ product.title }}</h2>\n");
    out.push_str("    <p class=\"price\">{{ product.price | money }}</p>\n");
    out.push_str("    <p>{{ product.description }}</p>\n");
    out.push_str("    {% form \"product\" %}<button type=\"submit\">Add to cart</button>{% endform %}\n");
    out.push_str("  </div>\n");
    out.push_str(&blocks_loop(schema));
    out.push_str("</section>\n");
    out
}

fn collection(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "collection");

    out.push_str("  <h2>{{ collection.title }}</h2>\n");
    out.push_str("  <div class=\"grid\">\n");
    out.push_str("    {% for product in collection.products %}\n");
    out.push_str("    <div class=\"card\">\n");
    out.push_str("      {{ product.featured_image | image_tag: product.title }}\n");
    out.push_str("      <h3>{{ product.title }}</h3>\n");
    out.push_str("      <p>{{ product.price | money }}</p>\n");
    out.push_str("    </div>\n");
    out.push_str("    {% endfor %}\n");
    out.push_str("  </div>\n");
    out.push_str("</section>\n");
    out
}

fn header(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "header");

    out.push_str("  <a href=\"/\">{{ shop.name }}</a>\n");
    out.push_str("  <nav>\n");
    out.push_str("    {% for link in linklists.main_menu.links %}\n");
    out.push_str("    <a href=\"{{ link.url }}\">{{ link.title }}</a>\n");
    out.push_str("    {% endfor %}\n");
    out.push_str("  </nav>\n");
    out.push_str("</section>\n");
    out
}

fn footer(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "footer");

    out.push_str("  <nav>\n");
    out.push_str("    {% for link in linklists.footer_menu.links %}\n");
    out.push_str("    <a href=\"{{ link.url }}\">{{ link.title }}</a>\n");
    out.push_str("    {% endfor %}\n");
    out.push_str("  </nav>\n");
    out.push_str("  <p>{{ shop.name }}</p>\n");
    out.push_str("</section>\n");
    out
}

fn generic(schema: &ComponentSchema) -> String {
    let mut out = section_open(schema, "generic");

    for setting in text_settings(&schema.settings) {
        out.push_str(&format!(
            "  <div class=\"{}\">{{{{ section.settings.{} }}}}</div>\n",
            setting.id, setting.id
        ));
    }

    out.push_str(&blocks_loop(schema));
    out.push_str("</section>\n");
    out
}

fn section_open(schema: &ComponentSchema, class: &str) -> String {
    format!(
        "<section class=\"section section--{}\" id=\"{{{{ section.id }}}}\" data-component=\"{}\">\n",
        class, schema.slug
    )
}

/// Settings whose values read as text in markup.
fn text_settings(settings: &[Setting]) -> impl Iterator<Item = &Setting> {
    settings.iter().filter(|setting| {
        matches!(setting.kind.as_str(), "text" | "textarea" | "richtext" | "html")
    })
}

/// Loop over block instances, printing the text settings any declared
/// block type carries. Settings a given block doesn't have render as
/// nothing.
fn blocks_loop(schema: &ComponentSchema) -> String {
    if schema.blocks.is_empty() {
        return String::new();
    }

    let mut ids = vec![];
    for block_type in &schema.blocks {
        for setting in text_settings(&block_type.settings) {
            if !ids.contains(&setting.id) {
                ids.push(setting.id.clone());
            }
        }
    }

    let mut out = String::from("  {% for block in section.blocks %}\n");
    out.push_str("  <div class=\"block block--{{ block.type }}\">\n");
    for id in ids {
        out.push_str(&format!("    <span>{{{{ block.settings.{} }}}}</span>\n", id));
    }
    out.push_str("  </div>\n");
    out.push_str("  {% endfor %}\n");
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock;
    use crate::template::{Context, Engine};

    fn schema(category: &str) -> ComponentSchema {
        ComponentSchema::from_json(&format!(
            r#"{{
                "slug": "preview",
                "name": "Preview",
                "category": "{}",
                "settings": [
                    {{"id": "heading", "type": "text", "default": "Big sale"}},
                    {{"id": "subheading", "type": "text"}}
                ],
                "blocks": [
                    {{"type": "item", "name": "Item", "settings": [
                        {{"id": "label", "type": "text", "default": "Item label"}}
                    ]}}
                ]
            }}"#,
            category
        ))
        .unwrap()
    }

    fn render(category: &str) -> String {
        let schema = schema(category);
        let source = template(&schema);
        let engine = Engine::storefront();
        let context = Context::try_from(mock::build_context(&schema, None)).unwrap();
        engine.compile(&source).unwrap().render(&context).unwrap()
    }

    #[test]
    fn test_every_category_renders() {
        for category in ["hero", "product", "collection", "header", "footer", "text", "unknown"] {
            let html = render(category);
            assert!(html.contains("<section"), "category {} produced no section", category);
        }
    }

    #[test]
    fn test_hero_uses_declared_settings() {
        let html = render("hero");
        assert!(html.contains("<h1>Big sale</h1>"));
        assert!(html.contains("Item label"));
    }

    #[test]
    fn test_product_formats_price() {
        let html = render("product");
        assert!(html.contains("$19.99"));
        assert!(html.contains("Add to cart"));
    }

    #[test]
    fn test_stylesheet_is_per_category() {
        assert!(stylesheet(Category::Hero).contains(".section--hero"));
        assert_ne!(stylesheet(Category::Hero), stylesheet(Category::Footer));
    }
}
