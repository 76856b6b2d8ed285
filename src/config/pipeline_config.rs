use crate::data::series::{AggregationRule, Frequency};
use crate::engine::derive::DerivedOp;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn default_date_column() -> String {
    "date".to_string()
}

fn default_value_column() -> String {
    "value".to_string()
}

//one raw series and how to read and aggregate it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    //column name in the panel
    pub name: String,

    //file path, relative to the data directory
    pub path: PathBuf,

    pub native_frequency: Frequency,
    pub aggregation_rule: AggregationRule,

    #[serde(default = "default_date_column")]
    pub date_column: String,

    #[serde(default = "default_value_column")]
    pub value_column: String,
}

impl SourceConfig {
    pub fn new(
        name: &str,
        path: &str,
        native_frequency: Frequency,
        aggregation_rule: AggregationRule,
    ) -> Self {
        SourceConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
            native_frequency,
            aggregation_rule,
            date_column: default_date_column(),
            value_column: default_value_column(),
        }
    }
}

//composite column computed after fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedConfig {
    pub name: String,
    pub op: DerivedOp,
    pub inputs: Vec<String>,
}

impl DerivedConfig {
    pub fn new(name: &str, op: DerivedOp, inputs: &[&str]) -> Self {
        DerivedConfig {
            name: name.to_string(),
            op,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

//complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfiguration {
    //region the panel describes, used in report titles
    pub region: String,

    //directory source paths are resolved against
    pub data_dir: PathBuf,

    //fused in this order, which is also the panel column order
    pub sources: Vec<SourceConfig>,

    //applied in order after fusion
    #[serde(default)]
    pub derived: Vec<DerivedConfig>,

    //optional output paths
    #[serde(default)]
    pub output_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_long_csv: Option<PathBuf>,
}

impl Default for PipelineConfiguration {
    fn default() -> Self {
        let quarterly_sum = |name: &str, path: &str| {
            SourceConfig::new(name, path, Frequency::Quarterly, AggregationRule::Sum)
        };

        let mut sources = vec![
            SourceConfig::new(
                "policy_rate_pct",
                "boc_policy_rate_daily.csv",
                Frequency::Daily,
                AggregationRule::Last,
            ),
            SourceConfig::new(
                "starts_saar_units",
                "ab_housing_starts_monthly.csv",
                Frequency::Monthly,
                AggregationRule::Mean,
            ),
            SourceConfig::new(
                "hpi_composite",
                "ab_hpi_monthly.csv",
                Frequency::Monthly,
                AggregationRule::Mean,
            ),
            quarterly_sum("immigrants", "ab_international_migration.csv"),
            quarterly_sum("net_non_permanent_residents", "ab_international_migration.csv"),
            quarterly_sum("net_emigration", "ab_international_migration.csv"),
            quarterly_sum("interprov_in", "ab_interprovincial_in.csv"),
            quarterly_sum("interprov_out", "ab_interprovincial_out.csv"),
        ];

        //the migration table is one wide file keyed by reference period
        for source in sources.iter_mut().filter(|s| {
            s.path == Path::new("ab_international_migration.csv")
        }) {
            source.date_column = "reference_period".to_string();
            source.value_column = source.name.clone();
        }

        PipelineConfiguration {
            region: "Alberta".to_string(),
            data_dir: PathBuf::from("data/raw"),
            sources,
            derived: vec![
                DerivedConfig::new(
                    "total_pressure",
                    DerivedOp::Sum,
                    &["immigrants", "net_non_permanent_residents"],
                ),
                DerivedConfig::new(
                    "interprov_net",
                    DerivedOp::Difference,
                    &["interprov_in", "interprov_out"],
                ),
            ],
            output_csv: Some(PathBuf::from("data/processed/ab_quarterly_panel.csv")),
            output_long_csv: None,
        }
    }
}

impl PipelineConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read configuration {:?}", path))?;
        let config: PipelineConfiguration = serde_json::from_str(&contents)
            .context(format!("Failed to parse configuration {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    //checks names before any file is touched
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sources.is_empty() {
            bail!("Configuration lists no sources");
        }

        let mut known = HashSet::new();
        for source in &self.sources {
            if !known.insert(source.name.as_str()) {
                bail!("Source name '{}' is used more than once", source.name);
            }
        }

        for derived in &self.derived {
            if derived.inputs.is_empty() {
                bail!("Derived column '{}' has no inputs", derived.name);
            }
            if let Some(missing) = derived.inputs.iter().find(|i| !known.contains(i.as_str())) {
                bail!(
                    "Derived column '{}' uses unknown input '{}'",
                    derived.name,
                    missing
                );
            }
            if !known.insert(derived.name.as_str()) {
                bail!("Derived column '{}' reuses an existing name", derived.name);
            }
        }

        Ok(())
    }
}
