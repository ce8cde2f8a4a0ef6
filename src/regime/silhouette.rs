//! Silhouette score, used to pick the best K out of the searched range.
//! `smartcore` does not ship a silhouette implementation, so this is a
//! direct, dependency-free port of the standard definition.

/// Mean silhouette coefficient over all points. `rows` are the clustered
/// feature vectors, `labels[i]` is the cluster assigned to `rows[i]`.
/// Returns `f64::NAN` if there are fewer than 2 clusters represented.
pub fn silhouette_score(rows: &[Vec<f64>], labels: &[u32]) -> f64 {
    let n = rows.len();
    if n < 2 || labels.len() != n {
        return f64::NAN;
    }

    let distinct: std::collections::HashSet<u32> = labels.iter().copied().collect();
    if distinct.len() < 2 {
        return f64::NAN;
    }

    let mut total = 0.0;
    let mut counted = 0usize;

    for i in 0..n {
        let own_cluster = labels[i];

        let mut same_dist_sum = 0.0;
        let mut same_count = 0usize;
        let mut other_cluster_dist: std::collections::HashMap<u32, (f64, usize)> = std::collections::HashMap::new();

        for j in 0..n {
            if i == j {
                continue;
            }
            let dist = euclidean(&rows[i], &rows[j]);
            if labels[j] == own_cluster {
                same_dist_sum += dist;
                same_count += 1;
            } else {
                let entry = other_cluster_dist.entry(labels[j]).or_insert((0.0, 0));
                entry.0 += dist;
                entry.1 += 1;
            }
        }

        if same_count == 0 {
            continue;
        }
        let a = same_dist_sum / same_count as f64;

        let b = other_cluster_dist
            .values()
            .map(|(sum, count)| sum / *count as f64)
            .fold(f64::MAX, f64::min);

        if b == f64::MAX {
            continue;
        }

        let s = if a.max(b) > f64::EPSILON { (b - a) / a.max(b) } else { 0.0 };
        total += s;
        counted += 1;
    }

    if counted == 0 {
        f64::NAN
    } else {
        total / counted as f64
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_separated_clusters_score_near_one() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
            vec![10.0, 10.1],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let score = silhouette_score(&rows, &labels);
        assert!(score > 0.9, "expected near-perfect separation, got {score}");
    }

    #[test]
    fn single_cluster_is_nan() {
        let rows = vec![vec![0.0], vec![1.0]];
        let labels = vec![0, 0];
        assert!(silhouette_score(&rows, &labels).is_nan());
    }
}
