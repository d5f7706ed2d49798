use crate::agent::tool::{parse_args, Tool};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Extra material for tabs and folds
const WASTE_FACTOR: f64 = 1.1;
/// One standard 50x50 cm cardboard sheet
const SHEET_AREA_CM2: f64 = 2500.0;

#[derive(Debug, Deserialize)]
struct MaterialArgs {
    length: f64,
    width: f64,
    height: f64,
}

/// Material estimate for a closed box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialEstimate {
    pub surface_area_cm2: f64,
    pub total_material_needed_cm2: f64,
    pub cardboard_sheets_needed: f64,
}

/// Surface area of a `length x width x height` box (cm) plus waste and sheet count
pub fn estimate_material(length: f64, width: f64, height: f64) -> MaterialEstimate {
    let surface_area = 2.0 * (length * width + length * height + width * height);
    let total_material = surface_area * WASTE_FACTOR;
    MaterialEstimate {
        surface_area_cm2: surface_area,
        total_material_needed_cm2: total_material,
        cardboard_sheets_needed: total_material / SHEET_AREA_CM2,
    }
}

/// A tool for estimating the cardboard needed for a box design.
pub struct CalculateMaterialTool;

#[async_trait]
impl Tool for CalculateMaterialTool {
    fn name(&self) -> &str {
        "calculate_material"
    }

    fn description(&self) -> &str {
        "Calculate the amount of material needed for a box with the given dimensions (centimeters). \
         Returns the surface area, total material including 10% for tabs and folds, and the number of 50x50cm cardboard sheets."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "length": {"type": "number", "description": "Length of the box in centimeters"},
                "width": {"type": "number", "description": "Width of the box in centimeters"},
                "height": {"type": "number", "description": "Height of the box in centimeters"}
            },
            "required": ["length", "width", "height"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: MaterialArgs = parse_args(self.name(), args)?;
        if [args.length, args.width, args.height]
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return Err(RouterError::InvalidToolArguments {
                tool_name: self.name().to_string(),
                reason: "dimensions must be finite and non-negative".to_string(),
            });
        }

        let estimate = estimate_material(args.length, args.width, args.height);
        Ok(serde_json::to_value(estimate)?)
    }
}
