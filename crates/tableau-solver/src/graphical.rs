//! Graphical method for two-variable problems.
//!
//! Enumerates the corner points of the feasible polygon and evaluates the
//! objective at each of them. Useful to cross-check the simplex solver and to
//! feed a plotting front-end.

use crate::problem::{ConstraintOp, LpProblem, ProblemError};
use crate::solution::SolutionStatus;

const TOLERANCE: f64 = 1e-9;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    /// Objective value at this corner
    pub objective: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicalSolution {
    pub status: SolutionStatus,
    /// Corners of the feasible region, counter-clockwise around their centroid
    pub vertices: Vec<Vertex>,
    /// Best corner; `None` unless the status is optimal
    pub optimum: Option<Vertex>,
    /// False when the feasible region extends to infinity
    pub bounded_region: bool,
}

/// `a * x + b * y = c`
#[derive(Debug, Clone, Copy)]
struct Line {
    a: f64,
    b: f64,
    c: f64,
}

impl Line {
    fn intersect(&self, other: &Line) -> Option<(f64, f64)> {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() < TOLERANCE {
            return None;
        }
        let x = (self.c * other.b - other.c * self.b) / det;
        let y = (self.a * other.c - other.a * self.c) / det;
        Some((x, y))
    }
}

fn snap(v: f64) -> f64 {
    if v.abs() < TOLERANCE { 0.0 } else { v }
}

fn is_feasible(problem: &LpProblem, point: [f64; 2]) -> bool {
    point.iter().all(|&v| v >= -TOLERANCE)
        && problem
            .constraints
            .iter()
            .all(|c| c.is_satisfied_by(&point, TOLERANCE * c.rhs.abs().max(1.0)))
}

/// Whether direction `d` is a ray of the region's recession cone
fn is_recession_ray(problem: &LpProblem, d: [f64; 2]) -> bool {
    if d[0] < -TOLERANCE || d[1] < -TOLERANCE {
        return false;
    }
    problem.constraints.iter().all(|c| {
        let dot = c.coefficients[0] * d[0] + c.coefficients[1] * d[1];
        match c.op {
            ConstraintOp::Le => dot <= TOLERANCE,
            ConstraintOp::Ge => dot >= -TOLERANCE,
            ConstraintOp::Eq => dot.abs() <= TOLERANCE,
        }
    })
}

/// Extreme rays of a 2-D recession cone lie on an axis or along a constraint boundary
fn candidate_rays(problem: &LpProblem) -> Vec<[f64; 2]> {
    let mut rays = vec![[1.0, 0.0], [0.0, 1.0]];
    for c in &problem.constraints {
        let (a, b) = (c.coefficients[0], c.coefficients[1]);
        let norm = a.hypot(b);
        if norm > TOLERANCE {
            rays.push([b / norm, -a / norm]);
            rays.push([-b / norm, a / norm]);
        }
    }
    rays
}

/// Solve a two-variable problem by enumerating the corners of its feasible region
pub fn solve(problem: &LpProblem) -> Result<GraphicalSolution, ProblemError> {
    problem.validate()?;
    if problem.num_variables() != 2 {
        return Err(ProblemError::NotTwoDimensional(problem.num_variables()));
    }

    let mut lines: Vec<Line> = problem
        .constraints
        .iter()
        .map(|c| Line {
            a: c.coefficients[0],
            b: c.coefficients[1],
            c: c.rhs,
        })
        .collect();
    // Non-negativity boundaries x = 0 and y = 0
    lines.push(Line { a: 1.0, b: 0.0, c: 0.0 });
    lines.push(Line { a: 0.0, b: 1.0, c: 0.0 });

    let mut points: Vec<[f64; 2]> = Vec::new();
    for (i, first) in lines.iter().enumerate() {
        for second in &lines[i + 1..] {
            let Some((x, y)) = first.intersect(second) else {
                continue;
            };
            let point = [snap(x), snap(y)];
            if !is_feasible(problem, point) {
                continue;
            }
            let duplicate = points.iter().any(|p| {
                (p[0] - point[0]).abs() <= TOLERANCE * point[0].abs().max(1.0)
                    && (p[1] - point[1]).abs() <= TOLERANCE * point[1].abs().max(1.0)
            });
            if !duplicate {
                points.push(point);
            }
        }
    }

    if points.is_empty() {
        return Ok(GraphicalSolution {
            status: SolutionStatus::Infeasible,
            vertices: Vec::new(),
            optimum: None,
            bounded_region: true,
        });
    }

    let n = points.len() as f64;
    let cx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = points.iter().map(|p| p[1]).sum::<f64>() / n;
    points.sort_by(|p, q| {
        let ap = (p[1] - cy).atan2(p[0] - cx);
        let aq = (q[1] - cy).atan2(q[0] - cx);
        ap.total_cmp(&aq)
    });

    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| Vertex {
            x: p[0],
            y: p[1],
            objective: problem.evaluate(p),
        })
        .collect();

    let rays: Vec<[f64; 2]> = candidate_rays(problem)
        .into_iter()
        .filter(|&d| is_recession_ray(problem, d))
        .collect();
    let bounded_region = rays.is_empty();

    // Improvement per unit step along d, in the problem's sense
    let sign = if problem.objective.minimize { -1.0 } else { 1.0 };
    let improves = rays.iter().any(|d| sign * problem.evaluate(d) > TOLERANCE);
    if improves {
        return Ok(GraphicalSolution {
            status: SolutionStatus::Unbounded,
            vertices,
            optimum: None,
            bounded_region,
        });
    }

    let mut optimum = vertices[0];
    for v in &vertices[1..] {
        if sign * (v.objective - optimum.objective) > TOLERANCE {
            optimum = *v;
        }
    }

    Ok(GraphicalSolution {
        status: SolutionStatus::Optimal,
        vertices,
        optimum: Some(optimum),
        bounded_region,
    })
}
