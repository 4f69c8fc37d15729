use crate::core::{BaseError, Result, Value, ValueMap};
use crate::object::BaseObject;

/// A base object that can be fitted.
///
/// An estimator counts as fitted once any of its fitted attributes is set.
/// `#[base_object(estimator)]` on a derived type implements this trait.
pub trait BaseEstimator: BaseObject {
    fn is_fitted(&self) -> bool {
        !self.fitted_state().is_empty()
    }

    fn check_is_fitted(&self) -> Result<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(BaseError::NotFitted(self.class().name().to_string()))
        }
    }

    /// Fitted attributes by name. With `deep`, fitted attributes of fitted
    /// components are added as `component__name`.
    fn get_fitted_params(&self, deep: bool) -> Result<ValueMap> {
        self.check_is_fitted()?;
        Ok(collect_fitted(self.as_base(), deep))
    }
}

fn collect_fitted(object: &dyn BaseObject, deep: bool) -> ValueMap {
    let mut fitted = object.fitted_state();
    if !deep {
        return fitted;
    }
    let components: Vec<(String, Value)> = object
        .params()
        .into_iter()
        .chain(fitted.clone())
        .filter(|(_, value)| matches!(value, Value::Object(_)))
        .collect();
    for (name, value) in components {
        let Value::Object(component) = value else {
            continue;
        };
        for (sub_name, sub_value) in collect_fitted(component.as_base(), true) {
            fitted.insert(format!("{name}__{sub_name}"), sub_value);
        }
    }
    fitted
}
