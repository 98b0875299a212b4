//! Sliding-window supervised dataset construction.

use crate::domain::errors::AnalyticsError;

/// Window geometry derived from the scaled series length `n`:
/// the trailing fifth of the data is held out for inference and the input
/// window is one twentieth of the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    pub window_size: usize,
    pub testing_steps: usize,
    pub future_offset: usize,
}

impl WindowPlan {
    pub fn for_len(n: usize, future_offset: usize) -> Self {
        let testing_steps = (n as f64 * 0.2).ceil() as usize;
        let window_size = ((n as f64 * 0.8).ceil() * 0.05).ceil() as usize;
        Self {
            window_size,
            testing_steps,
            future_offset,
        }
    }
}

/// Supervised examples split into a training prefix and the trailing
/// inference windows.
#[derive(Debug, Clone)]
pub struct SupervisedDataset {
    /// Training inputs, each of length `window_size`.
    pub train_inputs: Vec<Vec<f64>>,
    pub train_targets: Vec<f64>,
    /// The `testing_steps` windows the trained model is run over. Windows
    /// end one position before their example index, so the last one ends at
    /// the penultimate value and its prediction lands one step past the
    /// series.
    pub infer_windows: Vec<Vec<f64>>,
}

/// Builds examples over `scaled`: for each index `i` in
/// `window_size .. n - future_offset`, input is `scaled[i-window_size..i]`
/// and target is `scaled[i + future_offset]`; the last `testing_steps`
/// examples are withheld from training. Inference windows slide over the
/// tail `scaled[n - window_size - testing_steps..]`.
pub fn build_dataset(
    symbol: &str,
    scaled: &[f64],
    plan: &WindowPlan,
) -> Result<SupervisedDataset, AnalyticsError> {
    let n = scaled.len();
    let w = plan.window_size;

    let insufficient = || AnalyticsError::InsufficientHistory {
        symbol: symbol.to_string(),
        points: n,
        required: w + plan.testing_steps + plan.future_offset + 1,
    };

    if w == 0 || n < w + plan.future_offset + 1 {
        return Err(insufficient());
    }

    let mut inputs = Vec::with_capacity(n - w - plan.future_offset);
    let mut targets = Vec::with_capacity(n - w - plan.future_offset);
    for i in w..(n - plan.future_offset) {
        inputs.push(scaled[i - w..i].to_vec());
        targets.push(scaled[i + plan.future_offset]);
    }

    if inputs.len() <= plan.testing_steps {
        return Err(insufficient());
    }

    let train_len = inputs.len() - plan.testing_steps;
    inputs.truncate(train_len);
    targets.truncate(train_len);

    let tail = &scaled[n - w - plan.testing_steps..];
    let infer_windows: Vec<Vec<f64>> = (w..tail.len())
        .map(|i| tail[i - w..i].to_vec())
        .collect();

    Ok(SupervisedDataset {
        train_inputs: inputs,
        train_targets: targets,
        infer_windows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_ratios() {
        // n = 100: testing = 20, window = ceil(ceil(80) * 0.05) = 4
        let plan = WindowPlan::for_len(100, 1);
        assert_eq!(plan.testing_steps, 20);
        assert_eq!(plan.window_size, 4);

        // n = 365: testing = 73, window = ceil(292 * 0.05) = ceil(14.6) = 15
        let plan = WindowPlan::for_len(365, 1);
        assert_eq!(plan.testing_steps, 73);
        assert_eq!(plan.window_size, 15);
    }

    #[test]
    fn test_example_count() {
        let scaled: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let plan = WindowPlan::for_len(scaled.len(), 1);
        let ds = build_dataset("BTC-USD", &scaled, &plan).unwrap();

        // n - window - future = 100 - 4 - 1 = 95 examples in total
        assert_eq!(
            ds.train_inputs.len() + plan.testing_steps,
            scaled.len() - plan.window_size - plan.future_offset
        );
        assert_eq!(ds.train_inputs.len(), ds.train_targets.len());
        assert_eq!(ds.infer_windows.len(), plan.testing_steps);
    }

    #[test]
    fn test_window_contents_and_target_alignment() {
        let scaled: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let plan = WindowPlan {
            window_size: 3,
            testing_steps: 5,
            future_offset: 1,
        };
        let ds = build_dataset("BTC-USD", &scaled, &plan).unwrap();

        // First example: input = scaled[0..3], target = scaled[4]
        assert_eq!(ds.train_inputs[0], vec![0.0, 1.0, 2.0]);
        assert_eq!(ds.train_targets[0], 4.0);

        // Last inference window ends at the penultimate value; its target
        // position is one step past the series
        let last = ds.infer_windows.last().unwrap();
        assert_eq!(last, &vec![26.0, 27.0, 28.0]);
    }

    #[test]
    fn test_short_series_rejected() {
        let scaled = vec![0.1, 0.2, 0.3];
        let plan = WindowPlan {
            window_size: 3,
            testing_steps: 1,
            future_offset: 1,
        };
        let err = build_dataset("BTC-USD", &scaled, &plan).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientHistory { .. }));
    }

    #[test]
    fn test_all_examples_consumed_by_testing_rejected() {
        // 6 points, window 3, future 1 -> 2 examples; testing 2 leaves no training data
        let scaled = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
        let plan = WindowPlan {
            window_size: 3,
            testing_steps: 2,
            future_offset: 1,
        };
        let err = build_dataset("BTC-USD", &scaled, &plan).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientHistory { .. }));
    }
}
