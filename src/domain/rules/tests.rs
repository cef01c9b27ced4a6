// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    fn secs(value: f64) -> TimeSpec {
        TimeSpec::from_seconds(value)
    }

    fn whole_file(total: f64) -> InputExtent {
        InputExtent::new(Trim::new(), secs(total))
    }

    #[test]
    fn test_explicit_duration_beats_stop_time() {
        let output = Trim::new()
            .with_duration(secs(300.0))
            .with_stop(secs(600.0));
        let resolved = DurationResolver::resolve(&output, vec![whole_file(3600.0)]);
        assert_eq!(resolved, secs(300.0));
    }

    #[test]
    fn test_stop_minus_start() {
        let output = Trim::new().with_start(secs(60.0)).with_stop(secs(90.0));
        assert_eq!(DurationResolver::resolve(&output, vec![whole_file(3600.0)]), secs(30.0));

        let stop_only = Trim::new().with_stop(secs(45.0));
        assert_eq!(DurationResolver::resolve(&stop_only, Vec::new()), secs(45.0));
    }

    #[test]
    fn test_stop_before_start_clamps_to_zero() {
        let output = Trim::new().with_start(secs(90.0)).with_stop(secs(60.0));
        assert_eq!(DurationResolver::resolve(&output, Vec::new()), TimeSpec::ZERO);
    }

    #[test]
    fn test_longest_input_wins() {
        let inputs = vec![whole_file(100.0), whole_file(250.0), whole_file(30.0)];
        assert_eq!(DurationResolver::resolve(&Trim::new(), inputs), secs(250.0));
    }

    #[test]
    fn test_input_trims_shape_effective_length() {
        let by_duration = InputExtent::new(Trim::new().with_duration(secs(20.0)), secs(500.0));
        let by_stop = InputExtent::new(
            Trim::new().with_start(secs(10.0)).with_stop(secs(70.0)),
            secs(500.0),
        );
        let by_start = InputExtent::new(Trim::new().with_start(secs(450.0)), secs(500.0));

        assert_eq!(by_duration.effective_length(), secs(20.0));
        assert_eq!(by_stop.effective_length(), secs(60.0));
        assert_eq!(by_start.effective_length(), secs(50.0));
        assert_eq!(
            DurationResolver::resolve(&Trim::new(), vec![by_duration, by_stop, by_start]),
            secs(60.0)
        );
    }

    #[test]
    fn test_output_start_subtracts_from_longest() {
        let output = Trim::new().with_start(secs(40.0));
        assert_eq!(DurationResolver::resolve(&output, vec![whole_file(100.0)]), secs(60.0));
    }

    #[test]
    fn test_output_start_past_longest_is_zero() {
        let output = Trim::new().with_start(secs(400.0));
        assert_eq!(DurationResolver::resolve(&output, vec![whole_file(100.0)]), TimeSpec::ZERO);
    }

    #[test]
    fn test_no_inputs_no_trims() {
        assert_eq!(DurationResolver::resolve(&Trim::new(), Vec::new()), TimeSpec::ZERO);
    }
}
