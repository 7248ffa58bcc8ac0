//! Factor (potential function) arithmetic for variable elimination.
//!
//! A `Factor` is a flattened multi-dimensional table over a list of named
//! discrete variables. The node itself is always `variables[0]`; variables
//! are stored in mixed-radix order with the *last* variable changing
//! fastest (`encode_index`/`decode_index` below), mirroring how a CPT's
//! "parent state" columns are usually laid out.

use std::collections::HashMap;

/// A potential function over a set of discrete variables.
#[derive(Debug, Clone)]
pub struct Factor {
    pub variables: Vec<String>,
    pub cardinalities: Vec<usize>,
    pub values: Vec<f64>,
}

impl Factor {
    /// Build a factor directly from a flattened CPT. `variables[0]` is the
    /// node the CPT belongs to; the rest are its parents in the same order
    /// the CPT was flattened with.
    #[must_use]
    pub fn new(variables: Vec<String>, cardinalities: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(cardinalities.iter().product::<usize>(), values.len());
        Self {
            variables,
            cardinalities,
            values,
        }
    }

    /// Multiply two factors, taking the union of their variables.
    #[must_use]
    pub fn multiply(&self, other: &Factor) -> Factor {
        let mut new_variables = self.variables.clone();
        let mut new_cardinalities = self.cardinalities.clone();

        let mut other_indices: Vec<Option<usize>> = vec![None; other.variables.len()];
        for (i, var) in other.variables.iter().enumerate() {
            if let Some(pos) = self.variables.iter().position(|v| v == var) {
                other_indices[i] = Some(pos);
            } else {
                new_variables.push(var.clone());
                new_cardinalities.push(other.cardinalities[i]);
                other_indices[i] = Some(new_variables.len() - 1);
            }
        }

        let total_size: usize = new_cardinalities.iter().product();
        let mut new_values = vec![0.0; total_size];

        for (i, val) in new_values.iter_mut().enumerate() {
            let indices = Self::decode_index(i, &new_cardinalities);

            let self_idx = Self::encode_index(&indices[..self.variables.len()], &self.cardinalities);

            let other_idx_vec: Vec<usize> = other_indices
                .iter()
                .filter_map(|&idx| idx.map(|j| indices[j]))
                .collect();
            let other_idx = Self::encode_index(&other_idx_vec, &other.cardinalities);

            let self_val = self.values.get(self_idx).copied().unwrap_or(0.0);
            let other_val = other.values.get(other_idx).copied().unwrap_or(0.0);
            *val = self_val * other_val;
        }

        Factor {
            variables: new_variables,
            cardinalities: new_cardinalities,
            values: new_values,
        }
    }

    /// Sum out one variable.
    #[must_use]
    pub fn marginalize(&self, var: &str) -> Factor {
        let Some(var_idx) = self.variables.iter().position(|v| v == var) else {
            return self.clone();
        };

        let new_variables: Vec<String> = self
            .variables
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != var_idx)
            .map(|(_, v)| v.clone())
            .collect();

        let new_cardinalities: Vec<usize> = self
            .cardinalities
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != var_idx)
            .map(|(_, c)| *c)
            .collect();

        if new_variables.is_empty() {
            return Factor {
                variables: vec![],
                cardinalities: vec![],
                values: vec![self.values.iter().sum()],
            };
        }

        let total_size: usize = new_cardinalities.iter().product();
        let mut new_values = vec![0.0; total_size];

        for (i, &v) in self.values.iter().enumerate() {
            let indices = Self::decode_index(i, &self.cardinalities);
            let new_idx_vec: Vec<usize> = indices
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != var_idx)
                .map(|(_, idx)| *idx)
                .collect();
            let new_idx = Self::encode_index(&new_idx_vec, &new_cardinalities);
            new_values[new_idx] += v;
        }

        Factor {
            variables: new_variables,
            cardinalities: new_cardinalities,
            values: new_values,
        }
    }

    /// Zero out any assignment inconsistent with `evidence`.
    #[must_use]
    pub fn apply_evidence(&self, evidence: &HashMap<String, usize>) -> Factor {
        let mut new_values = self.values.clone();

        for (i, val) in new_values.iter_mut().enumerate() {
            let indices = Self::decode_index(i, &self.cardinalities);
            for (var_idx, var) in self.variables.iter().enumerate() {
                if let Some(&ev_val) = evidence.get(var) {
                    if indices[var_idx] != ev_val {
                        *val = 0.0;
                        break;
                    }
                }
            }
        }

        Factor {
            variables: self.variables.clone(),
            cardinalities: self.cardinalities.clone(),
            values: new_values,
        }
    }

    /// Sum of all entries, before any normalization.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Normalize so all entries sum to 1.0. No-op on an all-zero factor.
    pub fn normalize(&mut self) {
        let sum: f64 = self.values.iter().sum();
        if sum > 0.0 {
            for v in &mut self.values {
                *v /= sum;
            }
        }
    }

    #[must_use]
    pub fn decode_index(mut idx: usize, cardinalities: &[usize]) -> Vec<usize> {
        let mut indices = vec![0; cardinalities.len()];
        for i in (0..cardinalities.len()).rev() {
            indices[i] = idx % cardinalities[i];
            idx /= cardinalities[i];
        }
        indices
    }

    #[must_use]
    pub fn encode_index(indices: &[usize], cardinalities: &[usize]) -> usize {
        let mut idx = 0;
        let mut multiplier = 1;
        for i in (0..indices.len()).rev() {
            idx += indices[i] * multiplier;
            multiplier *= cardinalities.get(i).copied().unwrap_or(1);
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marginalize_then_sum_preserves_mass() {
        let f = Factor::new(
            vec!["a".into(), "b".into()],
            vec![2, 2],
            vec![0.1, 0.2, 0.3, 0.4],
        );
        let m = f.marginalize("b");
        assert_eq!(m.variables, vec!["a".to_string()]);
        assert!((m.values[0] - 0.3).abs() < 1e-9);
        assert!((m.values[1] - 0.7).abs() < 1e-9);
    }

    #[test]
    fn multiply_independent_factors() {
        let a = Factor::new(vec!["a".into()], vec![2], vec![0.3, 0.7]);
        let b = Factor::new(vec!["b".into()], vec![2], vec![0.4, 0.6]);
        let ab = a.multiply(&b);
        assert_eq!(ab.variables.len(), 2);
        assert!((ab.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn apply_evidence_zeroes_inconsistent_rows() {
        let f = Factor::new(vec!["a".into()], vec![2], vec![0.3, 0.7]);
        let mut ev = HashMap::new();
        ev.insert("a".to_string(), 1);
        let clamped = f.apply_evidence(&ev);
        assert_eq!(clamped.values[0], 0.0);
        assert_eq!(clamped.values[1], 0.7);
    }
}
