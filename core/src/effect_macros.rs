//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use composable_mvi_core::async_effect;
///
/// async_effect! {
///     let profile = repository.load_profile().await;
///     Some(ProfileAction::Loaded { profile })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug)]
    enum TestAction {
        AsyncResult { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect: Effect<TestAction, ()> = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }
}
