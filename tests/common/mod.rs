//! Shared fixture classes for the integration tests.
#![allow(dead_code)]

use estibase::prelude::*;
use estibase::{BaseError, FromParams, Result};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref FOO_CLASS: ObjectClass = ObjectClass::builder("Foo")
        .extends(&BASE_OBJECT)
        .tag("x", 1)
        .constructor::<Foo>()
        .build();
    pub static ref BAR_CLASS: ObjectClass = ObjectClass::builder("Bar")
        .extends(&FOO_CLASS)
        .tag("y", 2)
        .constructor::<Bar>()
        .build();
    pub static ref ALIASED_CLASS: ObjectClass = ObjectClass::builder("Aliased")
        .extends(&BASE_OBJECT)
        .tag("new_tag", "default")
        .aliases(
            AliasTable::new()
                .rename("old_tag", "new_tag", "2.0.0")
                .remove("legacy_flag", "1.5.0"),
        )
        .constructor::<Aliased>()
        .build();
    pub static ref FORECASTER_CLASS: ObjectClass = ObjectClass::builder("MeanForecaster")
        .extends(&BASE_ESTIMATOR)
        .tag("requires_fh", false)
        .constructor::<MeanForecaster>()
        .build();
    pub static ref PIPELINE_CLASS: ObjectClass = ObjectClass::builder("ScaledPipeline")
        .extends(&BASE_ESTIMATOR)
        .tag("is_composite", true)
        .constructor::<ScaledPipeline>()
        .build();
}

#[derive(Debug, BaseObject)]
#[base_object(class = FOO_CLASS)]
pub struct Foo {
    #[param(default = 1)]
    pub a: i64,
    #[param(default = "mean".to_string())]
    pub strategy: String,
    #[overrides]
    overrides: Overrides,
}

#[derive(Debug, BaseObject)]
#[base_object(class = BAR_CLASS, test_params = bar_test_params)]
pub struct Bar {
    #[param]
    pub values: Vec<i64>,
    #[param(default = 0.5)]
    pub b: f64,
    #[overrides]
    overrides: Overrides,
}

fn bar_test_params() -> Vec<ValueMap> {
    vec![values! { "values" => vec![1, 2, 3] }]
}

#[derive(Debug, BaseObject)]
#[base_object(class = ALIASED_CLASS, init = Aliased::init)]
pub struct Aliased {
    #[param(default)]
    pub level: i64,
    #[overrides]
    overrides: Overrides,
}

impl Aliased {
    fn init(&mut self) -> Result<()> {
        self.set_tags(values! { "constructed" => true })?;
        Ok(())
    }
}

#[derive(Debug, BaseObject)]
#[base_object(class = FORECASTER_CLASS, estimator, test_params = forecaster_test_params)]
pub struct MeanForecaster {
    #[param(default = 3)]
    pub window: u32,
    #[param(default)]
    pub random_state: Option<i64>,
    #[fitted]
    pub mean_: Option<f64>,
    #[fitted]
    pub history_: Option<Vec<f64>>,
    #[overrides]
    overrides: Overrides,
}

fn forecaster_test_params() -> Vec<ValueMap> {
    vec![
        values! { "window" => 2 },
        values! { "window" => 5, "random_state" => 42 },
    ]
}

impl MeanForecaster {
    pub fn fit(&mut self, y: &[f64]) -> Result<&mut Self> {
        let window = (self.window as usize).min(y.len()).max(1);
        let tail = &y[y.len().saturating_sub(window)..];
        self.mean_ = Some(tail.iter().sum::<f64>() / tail.len() as f64);
        self.history_ = Some(y.to_vec());
        Ok(self)
    }

    pub fn predict(&self) -> Result<f64> {
        self.check_is_fitted()?;
        Ok(self.mean_.unwrap_or_default())
    }
}

fn default_forecaster() -> ObjectRef {
    ObjectRef::new(MeanForecaster::from_params(ValueMap::new()).unwrap())
}

#[derive(Debug, BaseObject)]
#[base_object(class = PIPELINE_CLASS, estimator)]
pub struct ScaledPipeline {
    #[param(default = default_forecaster())]
    pub forecaster: ObjectRef,
    #[param(default = 1.0)]
    pub scale: f64,
    #[param(default)]
    pub random_state: Option<i64>,
    #[fitted]
    pub forecaster_: Option<ObjectRef>,
    #[overrides]
    overrides: Overrides,
    fit_calls: usize,
}

impl ScaledPipeline {
    pub fn fit(&mut self, y: &[f64]) -> Result<&mut Self> {
        let scaled: Vec<f64> = y.iter().map(|v| v * self.scale).collect();
        let template = self
            .forecaster
            .downcast_ref::<MeanForecaster>()
            .ok_or_else(|| BaseError::TypeMismatch("expected MeanForecaster".to_string()))?;
        let mut inner = template.clone_object()?;
        inner.fit(&scaled)?;
        self.forecaster_ = Some(ObjectRef::new(inner));
        self.fit_calls += 1;
        Ok(self)
    }

    pub fn fit_calls(&self) -> usize {
        self.fit_calls
    }
}

pub fn fitted_forecaster() -> MeanForecaster {
    let mut forecaster = MeanForecaster::from_params(values! { "window" => 2 }).unwrap();
    forecaster.fit(&[1.0, 2.0, 0.1 + 0.2]).unwrap();
    forecaster
}
