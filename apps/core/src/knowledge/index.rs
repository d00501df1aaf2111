use crate::error::AppError;

/// Scales `vector` to unit L2 norm in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Exact (brute-force) inner-product index over L2-normalised vectors, so
/// scores are cosine similarities.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Normalises and appends a vector. Its position is its id.
    pub fn add(&mut self, mut vector: Vec<f32>) -> Result<usize, AppError> {
        if vector.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        normalize(&mut vector);
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// Returns up to `k` `(id, score)` pairs, best first. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, AppError> {
        if query.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| (id, dot(&query, vector)))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(vectors: &[[f32; 2]]) -> FlatIpIndex {
        let mut index = FlatIpIndex::new(2);
        for v in vectors {
            index.add(v.to_vec()).unwrap();
        }
        index
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_scores_are_cosine_and_sorted() {
        let index = index(&[[0.0, 5.0], [10.0, 0.0], [1.0, 1.0]]);

        let hits = index.search(&[2.0, 0.0], 3).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert!((hits[1].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!(hits[2].1.abs() < 1e-6);
    }

    #[test]
    fn test_k_bounds() {
        let index = index(&[[1.0, 0.0], [0.0, 1.0]]);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = index(&[[1.0, 0.0], [2.0, 0.0], [0.0, 1.0]]);
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIpIndex::new(3);
        assert!(index.add(vec![1.0]).is_err());
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }
}
