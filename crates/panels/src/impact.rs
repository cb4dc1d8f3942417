//! Impact Forecasting: a prediction and a branding visual for one project
//! description, requested together and committed together.

use gateway::AiGateway;
use shared::error::GatewayError;
use shared::ngo::ForecastResult;
use std::sync::Arc;

use crate::action::{ActionOutcome, ActionSlot, PromptAction};
use crate::PanelError;

pub struct ImpactPanel {
    gateway: Arc<AiGateway>,
    forecast: PromptAction<ForecastResult>,
}

impl ImpactPanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            forecast: PromptAction::new("impact_forecast"),
        }
    }

    pub fn set_description(&self, text: impl Into<String>) {
        self.forecast.set_input(text);
    }

    pub fn description(&self) -> String {
        self.forecast.input()
    }

    pub fn forecast_slot(&self) -> ActionSlot<ForecastResult> {
        self.forecast.slot()
    }

    pub fn result(&self) -> Option<ForecastResult> {
        self.forecast.value()
    }

    /// Runs both requests at once. The first failure ends the action and
    /// nothing is committed; the previous result stays on screen.
    pub async fn forecast(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.forecast
            .run(|description| async move {
                let project_name = &gateway.settings().branding_project_name;
                let (prediction_text, branding_image) = futures::try_join!(
                    gateway.predict_impact(&description),
                    gateway.generate_project_branding(project_name, &description),
                )?;
                Ok::<_, GatewayError>(ForecastResult {
                    prediction_text,
                    branding_image,
                })
            })
            .await
    }

    pub fn teardown(&self) {
        self.forecast.teardown();
    }
}
