use imageproc::point::Point;
use imageproc::rect::Rect;

/// A line segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub start: Point<f32>,
    pub end: Point<f32>,
}

impl Segment {
    pub const fn new(start: Point<f32>, end: Point<f32>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        distance_from_point_to_point(&self.start, &self.end)
    }

    /// Perpendicular distance from `point` to the infinite line through this
    /// segment, or the distance to `start` if the segment has no length.
    pub fn distance_to_point(&self, point: &Point<f32>) -> f32 {
        let a = self.end.y - self.start.y;
        let b = self.start.x - self.end.x;
        let c = self.end.x * self.start.y - self.start.x * self.end.y;
        let denominator = a.hypot(b);
        if denominator == 0.0 {
            return distance_from_point_to_point(&self.start, point);
        }
        (a * point.x + b * point.y + c).abs() / denominator
    }
}

pub fn distance_from_point_to_point(p1: &Point<f32>, p2: &Point<f32>) -> f32 {
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

pub fn center_of_rect(rect: &Rect) -> Point<f32> {
    Point::new(
        rect.left() as f32 + rect.width() as f32 / 2.0,
        rect.top() as f32 + rect.height() as f32 / 2.0,
    )
}

fn to_f32(point: &Point<i32>) -> Point<f32> {
    Point::new(point.x as f32, point.y as f32)
}

/// Smallest rect containing every point. Width and height count pixels, so a
/// single point has a 1x1 bounding rect.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::at(min_x, min_y).of_size((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

/// Total length of a polyline, including the closing edge when `closed`.
pub fn arc_length(points: &[Point<i32>], closed: bool) -> f32 {
    let open: f32 = points
        .windows(2)
        .map(|w| distance_from_point_to_point(&to_f32(&w[0]), &to_f32(&w[1])))
        .sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 1 => {
            open + distance_from_point_to_point(&to_f32(last), &to_f32(first))
        }
        _ => open,
    }
}

/// Area enclosed by a polygon using the shoelace formula.
pub fn polygon_area(points: &[Point<i32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice_area.abs() as f32 / 2.0
}

/// Simplifies an open polyline with the Douglas-Peucker algorithm, keeping
/// both endpoints.
pub fn approximate_polyline(points: &[Point<i32>], epsilon: f32) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let chord = Segment::new(to_f32(&points[start]), to_f32(&points[end]));
        let (farthest, distance) = (start + 1..end)
            .map(|i| (i, chord.distance_to_point(&to_f32(&points[i]))))
            .fold((start, 0.0f32), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        if distance > epsilon {
            keep[farthest] = true;
            stack.push((start, farthest));
            stack.push((farthest, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, keep)| keep.then_some(*p))
        .collect()
}

/// Index of the point in `points` farthest from `from`, and that distance.
fn farthest_from(points: &[Point<i32>], from: &Point<i32>) -> (usize, f32) {
    let from = to_f32(from);
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, distance_from_point_to_point(&from, &to_f32(p))))
        .fold((0, 0.0f32), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
}

/// Simplifies a closed contour with the Douglas-Peucker algorithm.
///
/// The ring is cut at two points that are far apart: the point farthest from
/// the first point, and the point farthest from that one. Each arc between
/// them is simplified on its own, so the cut points are the only vertices
/// kept regardless of simplification, and the result never repeats a vertex.
/// On a convex outline both cut points are corners, wherever the contour
/// happens to start.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f32) -> Vec<Point<i32>> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let (a, _) = farthest_from(points, &points[0]);
    let (b, distance) = farthest_from(points, &points[a]);
    if distance == 0.0 {
        return vec![points[0]];
    }

    let (first, second) = (a.min(b), a.max(b));
    let mut polygon = approximate_polyline(&points[first..=second], epsilon);

    let mut return_path = points[second..].to_vec();
    return_path.extend_from_slice(&points[..=first]);
    let return_path = approximate_polyline(&return_path, epsilon);
    if return_path.len() > 2 {
        polygon.extend_from_slice(&return_path[1..return_path.len() - 1]);
    }

    polygon
}
