use model::TrajectoryPoint;

/// Thins a projectile flight path down to at most `max_points` samples with
/// largest-triangle-three-buckets, always keeping the first and last point.
pub fn downsample(mut points: Vec<TrajectoryPoint>, max_points: usize) -> Vec<TrajectoryPoint> {
    if points.len() <= max_points {
        return points;
    }
    if max_points < 3 {
        // Degenerate request, keep the endpoints.
        let last = points.pop();
        points.truncate(1);
        points.extend(last);
        return points;
    }

    let len = points.len();
    let bucket_size = (len - 2) as f64 / (max_points - 2) as f64;

    let mut sampled = Vec::with_capacity(max_points);
    sampled.push(points[0]);

    let mut prev_idx = 0;
    for i in 1..max_points - 1 {
        let bucket_start = ((i - 1) as f64 * bucket_size) as usize + 1;
        let mut bucket_end = (i as f64 * bucket_size) as usize + 1;
        if bucket_end >= len {
            bucket_end = len - 1;
        }

        // The next bucket's centroid acts as the third triangle vertex.
        let next_start = (i as f64 * bucket_size) as usize + 1;
        let mut next_end = ((i + 1) as f64 * bucket_size) as usize + 1;
        if next_end > len {
            next_end = len;
        }

        let mut avg_x = 0.0;
        let mut avg_y = 0.0;
        if next_end > next_start {
            for point in &points[next_start..next_end] {
                avg_x += point.x;
                avg_y += point.y;
            }
            let count = (next_end - next_start) as f64;
            avg_x /= count;
            avg_y /= count;
        }

        let mut best_idx = bucket_start;
        let mut best_area = -1.0;
        for j in bucket_start..bucket_end {
            let area = ((points[prev_idx].x - avg_x) * (points[j].y - points[prev_idx].y)
                - (points[prev_idx].x - points[j].x) * (avg_y - points[prev_idx].y))
                .abs();
            if area > best_area {
                best_area = area;
                best_idx = j;
            }
        }

        sampled.push(points[best_idx]);
        prev_idx = best_idx;
    }

    sampled.push(points[len - 1]);
    sampled
}
