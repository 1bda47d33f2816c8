use serde::{Deserialize, Serialize};

use super::ItemSchema;
use crate::form::{Control, FieldSpec};
use crate::page::PageName;

/// News entry on the "trabalhos" page (`pages/trabalhos/items`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    /// Free text such as "15 de Julho, 2024"; never parsed or sorted.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub image_alt: String,
}

impl NewsItem {
    /// Link pointing somewhere other than the page itself.
    pub fn external_link(&self) -> Option<&str> {
        match self.link.as_str() {
            "" | "#" => None,
            link => Some(link),
        }
    }
}

pub const NEWS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Título", Control::Text).required(),
    FieldSpec::new("date", "Data (ex: 15 de Julho, 2024)", Control::Text).required(),
    FieldSpec::new("summary", "Resumo", Control::TextArea { rows: 3 }).required(),
    FieldSpec::new("link", "Link (opcional)", Control::Text),
];

impl ItemSchema for NewsItem {
    const PAGE: PageName = PageName::Trabalhos;
    const FIELDS: &'static [FieldSpec] = NEWS_FIELDS;
    const IMAGE_LABEL: &'static str = "Imagem da Notícia";
    const REMOVE_PROMPT: &'static str =
        "Tem certeza que deseja remover esta notícia? A remoção será permanente ao salvar.";
    const LOAD_ERROR: &'static str = "Erro ao carregar notícias.";

    fn template() -> Self {
        Self::default()
    }

    fn heading(&self) -> String {
        if self.title.is_empty() {
            "Notícia: (Nova)".to_string()
        } else {
            format!("Notícia: {}", self.title)
        }
    }

    fn image(&self) -> &str {
        &self.image_src
    }

    fn set_image(&mut self, src: String) {
        self.image_src = src;
    }

    fn normalize(&mut self) {
        if self.link.is_empty() {
            self.link = "#".to_string();
        }
        self.image_alt = format!("Imagem da notícia: {}", self.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_link_becomes_anchor_on_write() {
        let mut item = NewsItem {
            title: "Feira de adoção".into(),
            ..NewsItem::default()
        };
        item.normalize();
        assert_eq!(item.link, "#");
        assert_eq!(item.image_alt, "Imagem da notícia: Feira de adoção");
        assert_eq!(item.external_link(), None);
    }

    #[test]
    fn heading_marks_new_items() {
        assert_eq!(NewsItem::template().heading(), "Notícia: (Nova)");
    }
}
