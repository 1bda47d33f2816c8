use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ItemSchema;
use crate::form::{Control, FieldSpec, SelectOption};
use crate::page::PageName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Anything other than `"female"` reads as male, so hand-edited records
/// stay listed and editable.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)?.as_str() {
            Some("female") => Gender::Female,
            _ => Gender::Male,
        })
    }
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Macho",
            Gender::Female => "Fêmea",
        }
    }
}

/// Animal available for adoption (`pages/adocao/items`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    #[serde(default)]
    pub name: String,
    /// Free text, e.g. "2 anos".
    #[serde(default)]
    pub age: String,
    /// One of [`SIZES`].
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub is_neutered: bool,
    #[serde(default)]
    pub is_vaccinated: bool,
    #[serde(default)]
    pub temperament: String,
    /// URL or inline data URI.
    #[serde(default)]
    pub image: String,
}

fn default_size() -> String {
    SIZES[0].value.to_string()
}

pub const SIZES: &[SelectOption] = &[
    SelectOption { value: "Pequeno", label: "Pequeno" },
    SelectOption { value: "Médio", label: "Médio" },
    SelectOption { value: "Grande", label: "Grande" },
];

const GENDERS: &[SelectOption] = &[
    SelectOption { value: "male", label: "Macho" },
    SelectOption { value: "female", label: "Fêmea" },
];

pub const ANIMAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Nome", Control::Text).required(),
    FieldSpec::new("age", "Idade", Control::Text).required(),
    FieldSpec::new("temperament", "Temperamento", Control::Text).required(),
    FieldSpec::new("size", "Porte", Control::Select(SIZES)),
    FieldSpec::new("gender", "Gênero", Control::Select(GENDERS)),
    FieldSpec::new("isNeutered", "Castrado", Control::Checkbox),
    FieldSpec::new("isVaccinated", "Vacinado", Control::Checkbox),
];

impl ItemSchema for Animal {
    const PAGE: PageName = PageName::Adocao;
    const FIELDS: &'static [FieldSpec] = ANIMAL_FIELDS;
    const IMAGE_LABEL: &'static str = "Foto";
    const REMOVE_PROMPT: &'static str = "Tem certeza que deseja remover este animal?";
    const LOAD_ERROR: &'static str = "Erro ao carregar animais.";

    fn template() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            size: default_size(),
            gender: Gender::Male,
            is_neutered: false,
            is_vaccinated: false,
            temperament: String::new(),
            image: String::new(),
        }
    }

    fn heading(&self) -> String {
        if self.name.is_empty() {
            "Animal: (Novo)".to_string()
        } else {
            format!("Animal: {}", self.name)
        }
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn set_image(&mut self, src: String) {
        self.image = src;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{apply_values, FormValues};
    use serde_json::json;

    #[test]
    fn decodes_stored_document_leniently() {
        let animal: Animal = serde_json::from_value(json!({
            "name": "Mel",
            "gender": "female",
            "isVaccinated": true
        }))
        .unwrap();
        assert_eq!(animal.name, "Mel");
        assert_eq!(animal.gender, Gender::Female);
        assert!(animal.is_vaccinated);
        assert!(!animal.is_neutered);
        assert_eq!(animal.size, "Pequeno");
    }

    #[test]
    fn unknown_gender_reads_as_male() {
        for gender in [json!("Macho"), json!(""), json!(null), json!(1)] {
            let animal: Animal =
                serde_json::from_value(json!({ "name": "Bob", "gender": gender })).unwrap();
            assert_eq!(animal.gender, Gender::Male);
        }
    }

    #[test]
    fn serializes_with_store_field_names() {
        let value = serde_json::to_value(Animal::template()).unwrap();
        for key in ["name", "age", "size", "gender", "isNeutered", "isVaccinated", "temperament", "image"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["gender"], "male");
    }

    #[test]
    fn form_values_map_onto_animal() {
        let values: FormValues = [
            ("name", "Thor"),
            ("age", "3 anos"),
            ("temperament", "Dócil"),
            ("size", "Grande"),
            ("gender", "female"),
            ("isNeutered", "on"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let animal = apply_values(&Animal::template(), ANIMAL_FIELDS, &values).unwrap();
        assert_eq!(animal.name, "Thor");
        assert_eq!(animal.size, "Grande");
        assert_eq!(animal.gender, Gender::Female);
        assert!(animal.is_neutered);
        assert!(!animal.is_vaccinated);
        assert_eq!(animal.heading(), "Animal: Thor");
    }
}
