//! Category display formatting

use tabled::Tabled;

use crate::models::Category;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    category_type: String,
}

pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    render_table(
        categories
            .iter()
            .map(|c| CategoryRow {
                id: c.id.to_string(),
                name: c.name.clone(),
                category_type: c.category_type.to_string(),
            })
            .collect(),
    )
}
