use co2cast_core::{
    Co2castConfig, FeatureSchema, GatewayStatus, InputCollector, Variant, VariantProfile,
};

pub struct AppState {
    pub variant: Variant,
    pub schema: FeatureSchema,
    pub gateway: GatewayStatus,
    pub model_source: String,
}

impl AppState {
    /// Loads the configured model once. A failed load still yields a state;
    /// the form then shows the load error.
    pub async fn from_config(config: &Co2castConfig) -> anyhow::Result<Self> {
        let schema = config.variant.schema()?;
        let gateway = co2cast_gateway::open_gateway(config).await;
        Ok(Self::new(config.variant, schema, gateway, config.model_source()))
    }

    pub fn new(
        variant: Variant,
        schema: FeatureSchema,
        gateway: GatewayStatus,
        model_source: String,
    ) -> Self {
        Self {
            variant,
            schema,
            gateway,
            model_source,
        }
    }

    pub fn profile(&self) -> &'static VariantProfile {
        self.variant.profile()
    }

    pub fn collector(&self) -> InputCollector {
        InputCollector::new(self.schema.clone())
    }
}
