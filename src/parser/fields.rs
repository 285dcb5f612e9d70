use super::characteristics::Sections;
use super::value::SpecValue;

pub const COLOR: (&str, &str) = ("Фізичні характеристики", "Колір");
pub const DISPLAY_SIZE: (&str, &str) = ("Дисплей", "Діагональ екрану");
pub const RESOLUTION: (&str, &str) = ("Дисплей", "Роздільна здатність екрану");
pub const MEMORY_VOLUME: (&str, &str) = ("Функції пам'яті", "Вбудована пам'ять");
pub const SERIES: (&str, &str) = ("Інші", "Модель");

/// Characteristic-derived record fields, flattened to column text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectedFields {
    pub color: Option<String>,
    pub display_size: Option<String>,
    pub resolution: Option<String>,
    pub memory_volume: Option<String>,
    pub series: Option<String>,
}

/// Exact section → characteristic lookup. `None` if either key is absent or
/// the value is empty.
pub fn project<'a>(sections: &'a Sections, section: &str, name: &str) -> Option<&'a SpecValue> {
    sections
        .get(section)
        .and_then(|chars| chars.get(name))
        .filter(|v| !v.is_empty())
}

pub fn project_all(sections: &Sections) -> ProjectedFields {
    let text = |(section, name): (&str, &str)| project(sections, section, name).map(SpecValue::to_text);
    ProjectedFields {
        color: text(COLOR),
        display_size: text(DISPLAY_SIZE),
        resolution: text(RESOLUTION),
        memory_volume: text(MEMORY_VOLUME),
        series: text(SERIES),
    }
}
