use lib_vera::{ExportConfig, ExportPlan, PackOptions};
use serde::{Deserialize, Serialize};

/// Everything the exporter remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub options: PackOptions,
    pub plan: ExportPlan,
    pub config: ExportConfig,
}
