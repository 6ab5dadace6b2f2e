//! Column alias and loader configuration.
//!
//! Source exports disagree on column naming (`REGION` vs `REG_NAT`,
//! `TIPO_RESIDUO` vs `tipo_residuo`). Rather than renaming per file, every
//! accepted spelling is enumerated here and matched after the same
//! trim-and-uppercase normalization the loader applies to headers. A YAML file
//! may override any field; omitted fields keep their defaults.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{cli::parse_delimiter, data::normalize_column_name, loader::RawTable};

pub const DEFAULT_MAX_COLUMNS: usize = 46;
pub const DEFAULT_WIDE_PREFIX: &str = "QRESIDUOS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub region_columns: Vec<String>,
    pub waste_type_columns: Vec<String>,
    pub quantity_columns: Vec<String>,
    pub wide_prefix: String,
    pub max_columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region_columns: vec!["REGION".into(), "REG_NAT".into()],
            waste_type_columns: vec![
                "TIPO_RESIDUO".into(),
                "TIPO_DE_RESIDUO".into(),
                "WASTE_TYPE".into(),
            ],
            quantity_columns: vec!["CANTIDAD".into(), "QUANTITY".into()],
            wide_prefix: DEFAULT_WIDE_PREFIX.into(),
            max_columns: DEFAULT_MAX_COLUMNS,
            delimiter: None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: PipelineConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(input).context("Parsing config YAML")?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        self.delimiter
            .as_deref()
            .map(|value| {
                parse_delimiter(value)
                    .map_err(|err| anyhow::anyhow!("Invalid delimiter in config: {err}"))
            })
            .transpose()
    }

    pub fn region_column(&self, table: &RawTable) -> Option<usize> {
        find_alias(table, &self.region_columns)
    }

    pub fn waste_type_column(&self, table: &RawTable) -> Option<usize> {
        find_alias(table, &self.waste_type_columns)
    }

    pub fn quantity_column(&self, table: &RawTable) -> Option<usize> {
        find_alias(table, &self.quantity_columns)
    }
}

/// First alias, in configured order, present among the table headers.
fn find_alias(table: &RawTable, aliases: &[String]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| table.column_index(&normalize_column_name(alias)))
}
