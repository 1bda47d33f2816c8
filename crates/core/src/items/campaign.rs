use chrono::{Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ItemSchema;
use crate::document::Item;
use crate::form::{Control, FieldSpec};
use crate::page::PageName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Ongoing,
    #[default]
    Closed,
}

/// Only `"ongoing"` is ongoing; any other stored value is a closed campaign.
impl<'de> Deserialize<'de> for CampaignStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)?.as_str() {
            Some("ongoing") => CampaignStatus::Ongoing,
            _ => CampaignStatus::Closed,
        })
    }
}

/// Vaccination / neutering campaign (`pages/campanhas/items`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub status: CampaignStatus,
    /// Sign-up link; only meaningful while the campaign is ongoing.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub image_alt: String,
}

impl Campaign {
    pub fn is_ongoing(&self) -> bool {
        self.status == CampaignStatus::Ongoing
    }
}

pub const CAMPAIGN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("year", "Ano", Control::Number).required(),
    FieldSpec::new(
        "status",
        "Em andamento",
        Control::Toggle {
            on: "ongoing",
            off: "closed",
        },
    ),
    FieldSpec::new("link", "Link de Inscrição (se aplicável)", Control::Text)
        .shown_when("status", "ongoing"),
];

impl ItemSchema for Campaign {
    const PAGE: PageName = PageName::Campanhas;
    const FIELDS: &'static [FieldSpec] = CAMPAIGN_FIELDS;
    const IMAGE_LABEL: &'static str = "Imagem do Poster";
    const REMOVE_PROMPT: &'static str =
        "Tem certeza que deseja remover esta campanha? A remoção será permanente ao salvar.";
    const LOAD_ERROR: &'static str = "Erro ao carregar campanhas.";

    fn template() -> Self {
        Self {
            year: Utc::now().year(),
            status: CampaignStatus::Closed,
            link: String::new(),
            image_src: String::new(),
            image_alt: String::new(),
        }
    }

    fn heading(&self) -> String {
        format!("Campanha {}", self.year)
    }

    fn image(&self) -> &str {
        &self.image_src
    }

    fn set_image(&mut self, src: String) {
        self.image_src = src;
    }

    fn normalize(&mut self) {
        if !self.is_ongoing() {
            self.link = "#".to_string();
        }
        self.image_alt = format!("Campanha de {}", self.year);
    }

    fn sort_for_edit(items: &mut [Item<Self>]) {
        sort_newest_first(items);
    }
}

/// Stable sort by year, newest first. Equal years keep their store order.
pub fn sort_newest_first(items: &mut [Item<Campaign>]) {
    items.sort_by(|a, b| b.record.year.cmp(&a.record.year));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, year: i32) -> Item<Campaign> {
        Item {
            id: id.to_string(),
            record: Campaign {
                year,
                ..Campaign::template()
            },
        }
    }

    #[test]
    fn sorts_newest_first_keeping_ties_in_store_order() {
        let mut items = vec![item("a", 2021), item("b", 2023), item("c", 2022), item("d", 2023)];
        sort_newest_first(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn normalize_clears_link_of_closed_campaign() {
        let mut closed = Campaign {
            year: 2022,
            status: CampaignStatus::Closed,
            link: "https://forms.example/inscricao".into(),
            image_src: String::new(),
            image_alt: String::new(),
        };
        closed.normalize();
        assert_eq!(closed.link, "#");
        assert_eq!(closed.image_alt, "Campanha de 2022");

        let mut ongoing = Campaign {
            status: CampaignStatus::Ongoing,
            link: "https://forms.example/inscricao".into(),
            ..closed
        };
        ongoing.normalize();
        assert_eq!(ongoing.link, "https://forms.example/inscricao");
    }

    #[test]
    fn unknown_status_reads_as_closed() {
        let campaign: Campaign =
            serde_json::from_value(serde_json::json!({ "year": 2019, "status": "" })).unwrap();
        assert_eq!(campaign.status, CampaignStatus::Closed);

        let campaign: Campaign =
            serde_json::from_value(serde_json::json!({ "year": 2025, "status": "ongoing" })).unwrap();
        assert!(campaign.is_ongoing());
    }

    #[test]
    fn template_defaults_to_current_year() {
        assert_eq!(Campaign::template().year, Utc::now().year());
        assert_eq!(Campaign::template().status, CampaignStatus::Closed);
    }
}
