//! Stacked-LSTM regression model over scaled close prices.
//!
//! Architecture:
//! - Input: a window of scaled closes, one feature per step
//! - Three LSTM layers, `hidden_units` each, dropout between them
//! - Output: single linear unit (next scaled close)

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::ops::Dropout;
use candle_nn::rnn::{lstm, LSTMConfig, LSTM, RNN};
use candle_nn::{linear, AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use tracing::debug;

pub struct SequenceModel {
    device: Device,
    varmap: VarMap,
    lstm1: LSTM,
    lstm2: LSTM,
    lstm3: LSTM,
    dropout: Dropout,
    head: Linear,
}

impl SequenceModel {
    /// Fresh randomly-initialized model; nothing is cached across requests.
    pub fn new(hidden_units: usize, dropout_rate: f32) -> Result<Self> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let lstm1 = lstm(1, hidden_units, LSTMConfig::default(), vs.pp("lstm1"))?;
        let lstm2 = lstm(hidden_units, hidden_units, LSTMConfig::default(), vs.pp("lstm2"))?;
        let lstm3 = lstm(hidden_units, hidden_units, LSTMConfig::default(), vs.pp("lstm3"))?;
        let head = linear(hidden_units, 1, vs.pp("head"))?;

        Ok(Self {
            device,
            varmap,
            lstm1,
            lstm2,
            lstm3,
            dropout: Dropout::new(dropout_rate),
            head,
        })
    }

    /// Hidden states of one layer stacked back into a
    /// `(batch, seq_len, hidden)` sequence for the next layer.
    fn hidden_sequence(states: &[candle_nn::rnn::LSTMState]) -> Result<Tensor> {
        let hs: Vec<Tensor> = states.iter().map(|s| s.h().clone()).collect();
        if hs.is_empty() {
            return Err(anyhow!("empty sequence in forward pass"));
        }
        Ok(Tensor::stack(&hs, 1)?)
    }

    /// Forward pass over a `(batch, seq_len, 1)` tensor.
    fn forward(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let h = Self::hidden_sequence(&self.lstm1.seq(xs)?)?;
        let h = self.dropout.forward(&h, train)?;

        let h = Self::hidden_sequence(&self.lstm2.seq(&h)?)?;
        let h = self.dropout.forward(&h, train)?;

        let states = self.lstm3.seq(&h)?;
        let last = states
            .last()
            .ok_or_else(|| anyhow!("empty sequence in forward pass"))?;
        let h = self.dropout.forward(last.h(), train)?;

        Ok(self.head.forward(&h)?)
    }

    fn windows_to_tensor(&self, windows: &[Vec<f64>]) -> Result<Tensor> {
        let batch = windows.len();
        let seq_len = windows
            .first()
            .map(|w| w.len())
            .ok_or_else(|| anyhow!("no input windows"))?;

        let mut flat = Vec::with_capacity(batch * seq_len);
        for window in windows {
            flat.extend(window.iter().map(|&v| v as f32));
        }

        Ok(Tensor::from_vec(flat, (batch, seq_len, 1), &self.device)?)
    }

    /// Fits the model with MSE loss and AdamW, full-batch per epoch.
    /// Returns the loss history; a non-finite loss aborts the fit.
    pub fn fit(
        &self,
        inputs: &[Vec<f64>],
        targets: &[f64],
        epochs: usize,
        learning_rate: f64,
    ) -> Result<Vec<f64>> {
        let input_tensor = self.windows_to_tensor(inputs)?;
        let target_vec: Vec<f32> = targets.iter().map(|&t| t as f32).collect();
        let target_tensor = Tensor::from_vec(target_vec, (targets.len(), 1), &self.device)?;

        let params = ParamsAdamW {
            lr: learning_rate,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(self.varmap.all_vars(), params)?;

        let mut history = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let predictions = self.forward(&input_tensor, true)?;
            let loss = predictions.sub(&target_tensor)?.sqr()?.mean_all()?;
            let loss_val = loss.to_scalar::<f32>()? as f64;

            if !loss_val.is_finite() {
                return Err(anyhow!("loss diverged at epoch {}: {}", epoch, loss_val));
            }

            optimizer.backward_step(&loss)?;
            debug!("SequenceModel: epoch {} loss {:.6}", epoch, loss_val);
            history.push(loss_val);
        }

        Ok(history)
    }

    /// Runs the model (dropout disabled) over a batch of windows.
    pub fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let input_tensor = self.windows_to_tensor(windows)?;
        let out = self.forward(&input_tensor, false)?;
        let values: Vec<f32> = out.squeeze(1)?.to_vec1()?;
        Ok(values.into_iter().map(|v| v as f64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        assert!(SequenceModel::new(8, 0.2).is_ok());
    }

    #[test]
    fn test_predict_shape() {
        let model = SequenceModel::new(4, 0.0).unwrap();
        let windows = vec![vec![0.1, 0.2, 0.3], vec![0.2, 0.3, 0.4]];
        let out = model.predict(&windows).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_fit_reports_loss_per_epoch() {
        let model = SequenceModel::new(4, 0.0).unwrap();
        let inputs = vec![
            vec![0.0, 0.1, 0.2],
            vec![0.1, 0.2, 0.3],
            vec![0.2, 0.3, 0.4],
            vec![0.3, 0.4, 0.5],
        ];
        let targets = vec![0.3, 0.4, 0.5, 0.6];

        let history = model.fit(&inputs, &targets, 3, 1e-2).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_predict_rejects_empty_batch() {
        let model = SequenceModel::new(4, 0.0).unwrap();
        assert!(model.predict(&[]).is_err());
    }
}
