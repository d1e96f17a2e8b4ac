use crate::models::Category;

/// Keyword → category table, scanned in order.
pub(crate) const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("rent", Category::Housing),
    ("mortgage", Category::Housing),
    ("apartment", Category::Housing),
    ("uber", Category::Transportation),
    ("taxi", Category::Transportation),
    ("lyft", Category::Transportation),
    ("gas", Category::Transportation),
    ("grocery", Category::Food),
    ("groceries", Category::Food),
    ("restaurant", Category::Food),
    ("dinner", Category::Food),
    ("lunch", Category::Food),
    ("breakfast", Category::Food),
    ("takeout", Category::Food),
    ("electricity", Category::Utilities),
    ("water", Category::Utilities),
    ("internet", Category::Utilities),
    ("phone", Category::Utilities),
    ("insurance", Category::Insurance),
    ("doctor", Category::Healthcare),
    ("medical", Category::Healthcare),
    ("medicine", Category::Healthcare),
    ("pharmacy", Category::Healthcare),
    ("savings", Category::Savings),
    ("investment", Category::Investment),
    ("stocks", Category::Investment),
    ("crypto", Category::Investment),
    ("clothes", Category::Personal),
    ("haircut", Category::Personal),
    ("gym", Category::Personal),
    ("movie", Category::Entertainment),
    ("game", Category::Entertainment),
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("salary", Category::Salary),
    ("paycheck", Category::Salary),
    ("business", Category::Business),
    ("freelance", Category::Business),
    ("gift", Category::Gift),
];

const MAX_PREDICTIONS: usize = 3;

/// Rank categories by how many table keywords occur in `description`.
///
/// Each keyword counts at most once. Ties keep `Category::all()` order.
/// Returns at most three categories, or `[Other]` when nothing matches.
pub fn predict_categories(description: &str) -> Vec<Category> {
    if description.trim().is_empty() {
        return vec![Category::Other];
    }

    let desc = description.to_lowercase();
    let mut counts = [0u32; Category::COUNT];
    for (kw, cat) in CATEGORY_KEYWORDS {
        if desc.contains(kw) {
            counts[*cat as usize] += 1;
        }
    }

    let mut ranked: Vec<Category> = Category::all().to_vec();
    // Stable sort keeps enumeration order among equal counts.
    ranked.sort_by(|a, b| counts[*b as usize].cmp(&counts[*a as usize]));

    let top: Vec<Category> = ranked
        .into_iter()
        .take(MAX_PREDICTIONS)
        .filter(|c| counts[*c as usize] > 0)
        .collect();

    if top.is_empty() {
        vec![Category::Other]
    } else {
        top
    }
}
