mod common;

use common::{Bar, Foo, MeanForecaster, ScaledPipeline, fitted_forecaster};
use estibase::prelude::*;
use estibase::testing::check_object_contract;
use estibase::{BaseError, FromParams, safe_clone, set_random_state};

#[test]
fn test_get_params_shallow_and_deep() {
    let pipeline = ScaledPipeline::create_test_instance().unwrap();

    let shallow = pipeline.get_params(false);
    assert_eq!(
        shallow.keys().collect::<Vec<_>>(),
        vec!["forecaster", "random_state", "scale"]
    );

    let deep = pipeline.get_params(true);
    assert_eq!(deep["forecaster__window"], Value::Int(3));
    assert_eq!(deep["forecaster__random_state"], Value::Null);
    assert_eq!(deep["scale"], Value::Float(1.0));
    assert!(deep.contains_key("forecaster"));
}

#[test]
fn test_param_names_and_defaults() {
    let bar = Bar::create_test_instance().unwrap();
    assert_eq!(bar.get_param_names(), vec!["b", "values"]);

    let defaults = bar.get_param_defaults();
    assert_eq!(defaults["b"], Value::Float(0.5));
    assert!(!defaults.contains_key("values"));
}

#[test]
fn test_clone_equals_original() {
    let bar = Bar::create_test_instance().unwrap();
    let clone = bar.clone_object().unwrap();
    assert_eq!(bar, clone);
    assert!(bar.equals(&clone));
}

#[test]
fn test_mutating_clone_breaks_equality() {
    let bar = Bar::create_test_instance().unwrap();
    let mut clone = bar.clone_object().unwrap();
    clone.set_params(values! { "b" => 0.75 }).unwrap();
    assert_ne!(bar, clone);
    assert_eq!(bar.b, 0.5);
}

#[test]
fn test_different_types_are_not_equal() {
    let foo = Foo::create_test_instance().unwrap();
    let bar = Bar::create_test_instance().unwrap();
    assert!(!foo.equals(&bar));
}

#[test]
fn test_nested_objects_compare_structurally() {
    let a = ScaledPipeline::create_test_instance().unwrap();
    let b = ScaledPipeline::create_test_instance().unwrap();
    assert!(!a.forecaster.ptr_eq(&b.forecaster));
    assert_eq!(a, b);

    let clone = a.clone_object().unwrap();
    assert!(!clone.forecaster.ptr_eq(&a.forecaster));
    assert_eq!(clone.forecaster, a.forecaster);
}

#[test]
fn test_clone_is_unfitted() {
    let forecaster = fitted_forecaster();
    assert!(forecaster.is_fitted());

    let clone = forecaster.clone_object().unwrap();
    assert!(!clone.is_fitted());
    assert_eq!(clone, forecaster);
}

#[test]
fn test_reset_discards_fitted_state_and_is_idempotent() {
    let mut pipeline = ScaledPipeline::create_test_instance().unwrap();
    pipeline.fit(&[1.0, 2.0, 3.0]).unwrap();
    assert!(pipeline.is_fitted());
    assert_eq!(pipeline.fit_calls(), 1);
    let params = pipeline.get_params(true);

    pipeline.reset().unwrap();
    assert!(!pipeline.is_fitted());
    assert_eq!(pipeline.fit_calls(), 0);
    assert_eq!(pipeline.get_params(true), params);

    let once = (pipeline.params(), pipeline.overrides().clone());
    pipeline.reset().unwrap();
    assert_eq!((pipeline.params(), pipeline.overrides().clone()), once);
}

#[test]
fn test_set_params_unknown_key() {
    let mut foo = Foo::create_test_instance().unwrap();
    let err = foo.set_params(values! { "nope" => 1 }).unwrap_err();
    assert!(matches!(
        err,
        BaseError::InvalidParameter { ref param, ref class } if param == "nope" && class == "Foo"
    ));
}

#[test]
fn test_set_params_is_atomic() {
    let mut foo = Foo::create_test_instance().unwrap();
    let result = foo.set_params(values! { "a" => 10, "strategy" => 3 });
    assert!(matches!(result, Err(BaseError::TypeMismatch(_))));
    assert_eq!(foo.a, 1);
    assert_eq!(foo.strategy, "mean");
}

#[test]
fn test_set_params_routes_nested_keys() {
    let mut pipeline = ScaledPipeline::create_test_instance().unwrap();
    let original = pipeline.forecaster.clone();

    pipeline
        .set_params(values! { "forecaster__window" => 7, "scale" => 2.0 })
        .unwrap();

    assert_eq!(pipeline.get_params(true)["forecaster__window"], Value::Int(7));
    assert_eq!(pipeline.scale, 2.0);
    let inner = pipeline.forecaster.downcast_ref::<MeanForecaster>().unwrap();
    assert_eq!(inner.window, 7);
    assert_eq!(original.downcast_ref::<MeanForecaster>().unwrap().window, 3);
}

#[test]
fn test_set_params_nested_on_non_object() {
    let mut pipeline = ScaledPipeline::create_test_instance().unwrap();
    let err = pipeline.set_params(values! { "scale__x" => 1 }).unwrap_err();
    assert!(matches!(err, BaseError::InvalidParameter { ref param, .. } if param == "scale__x"));

    let err = pipeline
        .set_params(values! { "forecaster__unknown" => 1 })
        .unwrap_err();
    assert!(matches!(err, BaseError::InvalidParameter { ref param, .. } if param == "unknown"));
}

#[test]
fn test_missing_required_parameter() {
    let err = Bar::from_params(ValueMap::new()).unwrap_err();
    assert!(matches!(
        err,
        BaseError::MissingParameter { ref param, ref class } if param == "values" && class == "Bar"
    ));
}

#[test]
fn test_random_state_is_deterministic_and_nested() {
    let pipeline = ScaledPipeline::create_test_instance().unwrap();

    let a = pipeline.clone_with_random_state(Some(42)).unwrap();
    let b = pipeline.clone_with_random_state(Some(42)).unwrap();
    let c = pipeline.clone_with_random_state(Some(7)).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);

    let params = a.get_params(true);
    let outer = params["random_state"].as_i64().unwrap();
    let inner = params["forecaster__random_state"].as_i64().unwrap();
    assert!((0..i32::MAX as i64).contains(&outer));
    assert!((0..i32::MAX as i64).contains(&inner));

    let untouched = pipeline.clone_with_random_state(None).unwrap();
    assert_eq!(untouched, pipeline);
}

#[test]
fn test_set_random_state_without_random_params_is_noop() {
    let mut foo = Foo::create_test_instance().unwrap();
    set_random_state(&mut foo, 3).unwrap();
    assert_eq!(foo, Foo::create_test_instance().unwrap());
}

#[test]
fn test_safe_clone_of_boxed_object() {
    let boxed: Box<dyn BaseObject> = Box::new(fitted_forecaster());
    let clone = safe_clone(boxed.as_ref()).unwrap();
    assert!(clone.equals(boxed.as_ref()));
    assert!(clone.fitted_state().is_empty());
    assert_eq!(clone.class().name(), "MeanForecaster");
}

#[test]
fn test_estimator_fitted_checks() {
    let mut forecaster = MeanForecaster::create_test_instance().unwrap();
    assert!(!forecaster.is_fitted());
    assert!(matches!(
        forecaster.check_is_fitted(),
        Err(BaseError::NotFitted(name)) if name == "MeanForecaster"
    ));
    assert!(forecaster.predict().is_err());
    assert!(forecaster.get_fitted_params(false).is_err());

    forecaster.fit(&[2.0, 4.0]).unwrap();
    assert!(forecaster.check_is_fitted().is_ok());
    assert_eq!(forecaster.predict().unwrap(), 3.0);

    let fitted = forecaster.get_fitted_params(false).unwrap();
    assert_eq!(fitted["mean"], Value::Float(3.0));
    assert_eq!(fitted["history"], Value::from(vec![2.0, 4.0]));
}

#[test]
fn test_fitted_params_deep_includes_components() {
    let mut pipeline = ScaledPipeline::create_test_instance().unwrap();
    pipeline.fit(&[1.0, 3.0]).unwrap();

    let shallow = pipeline.get_fitted_params(false).unwrap();
    assert!(shallow.contains_key("forecaster"));
    assert!(!shallow.contains_key("forecaster__mean"));

    let deep = pipeline.get_fitted_params(true).unwrap();
    assert_eq!(deep["forecaster__mean"], Value::Float(2.0));
    assert_eq!(deep["forecaster__history"], Value::from(vec![1.0, 3.0]));
}

#[test]
fn test_test_instances_and_names() {
    let (instances, names) = MeanForecaster::create_test_instances_and_names().unwrap();
    assert_eq!(names, vec!["MeanForecaster-0", "MeanForecaster-1"]);
    assert_eq!(instances[1].window, 5);
    assert_eq!(instances[1].random_state, Some(42));

    let (_, names) = Bar::create_test_instances_and_names().unwrap();
    assert_eq!(names, vec!["Bar"]);

    let (_, names) = Foo::create_test_instances_and_names().unwrap();
    assert_eq!(names, vec!["Foo"]);
}

#[test]
fn test_fixtures_satisfy_object_contract() {
    check_object_contract::<Foo>().unwrap();
    check_object_contract::<Bar>().unwrap();
    check_object_contract::<MeanForecaster>().unwrap();
    check_object_contract::<ScaledPipeline>().unwrap();
    check_object_contract::<common::Aliased>().unwrap();
}
