//! # Deformers
//!
//! Per-vertex position maps. None of these touch topology; each computes the
//! new positions from the unmoved mesh, writes them in one pass and then
//! refreshes the affected face normals.

use std::f64::consts::TAU;

use config::constants::{HEIGHT_ANGLE_THRESHOLD, MAX_CORRECTION_ANGLE};
use glam::DVec3;

use super::{moved, NoiseParams, RelaxParams, SpherifyParams};
use crate::error::MeshError;
use crate::geometry::{centroid, Frame, Plane};
use crate::mesh::{ChangeTag, Domain, EdgeChain, MeshKernel};
use crate::noise::NoiseEvaluator;

impl MeshKernel {
    /// Laplacian smoothing toward the average of each vertex's neighbor
    /// ring. Rings are captured once; every pass reads the positions of the
    /// previous pass only.
    pub fn relax(&mut self, selection: &[usize], domain: Domain, params: &RelaxParams) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let rings: Vec<Vec<usize>> = vertices.iter().map(|&v| self.vertex_neighbors(v)).collect();

        for _ in 0..params.iterations {
            let targets: Vec<Option<DVec3>> = vertices
                .iter()
                .zip(&rings)
                .map(|(&v, ring)| {
                    centroid(&self.positions, ring).map(|avg| self.positions[v].lerp(avg, params.factor))
                })
                .collect();
            self.write_positions(&vertices, targets);
        }
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Pulls vertices onto a sphere.
    pub fn spherify(&mut self, selection: &[usize], domain: Domain, params: &SpherifyParams) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let Some(auto_center) = centroid(&self.positions, &vertices) else {
            return Ok(Vec::new());
        };
        let center = params.center.unwrap_or(auto_center);
        let radius = params.radius.unwrap_or_else(|| {
            vertices.iter().map(|&v| self.positions[v].distance(center)).sum::<f64>() / vertices.len() as f64
        });

        let targets: Vec<Option<DVec3>> = vertices
            .iter()
            .map(|&v| {
                let p = self.positions[v];
                (p - center)
                    .try_normalize()
                    .map(|dir| p.lerp(center + dir * radius, params.factor))
            })
            .collect();
        self.write_positions(&vertices, targets);
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Displaces vertices along `params.axis` by a noise field sampled at
    /// their current position.
    pub fn noise(&mut self, selection: &[usize], domain: Domain, params: &NoiseParams, field: &dyn NoiseEvaluator) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let targets: Vec<Option<DVec3>> = vertices
            .iter()
            .map(|&v| {
                let p = self.positions[v];
                let n = field.evaluate(p.x, p.y, p.z, params.octaves, params.lacunarity, params.gain);
                Some(p + params.axis * (n * params.amount))
            })
            .collect();
        self.write_positions(&vertices, targets);
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Moves vertices along their normals so adjacent faces shift by about
    /// `amount`.
    pub fn push(&mut self, selection: &[usize], domain: Domain, amount: f64) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let targets: Vec<Option<DVec3>> = vertices
            .iter()
            .map(|&v| {
                let normal = self.vertex_normal(v).try_normalize()?;
                let spread = self.parent_faces[v]
                    .iter()
                    .map(|&f| normal.angle_between(self.normals[f]))
                    .fold(0.0, f64::max);
                let length = if spread < HEIGHT_ANGLE_THRESHOLD {
                    amount
                } else {
                    amount / spread.min(MAX_CORRECTION_ANGLE).cos()
                };
                Some(self.positions[v] + normal * length)
            })
            .collect();
        self.write_positions(&vertices, targets);
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Projects the vertices of the selected faces onto one plane through
    /// their average center, facing `normal` or the average face normal.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` when the plane normal has zero length.
    pub fn make_planar(&mut self, selection: &[usize], domain: Domain, normal: Option<DVec3>) -> Result<Vec<ChangeTag>, MeshError> {
        let faces = self.convert_selection(selection, domain, Domain::Face);
        if faces.is_empty() {
            return Ok(Vec::new());
        }
        let normal = normal
            .unwrap_or_else(|| faces.iter().map(|&f| self.normals[f]).sum())
            .try_normalize()
            .ok_or_else(|| MeshError::degenerate("planar target normal has zero length"))?;
        let center = faces.iter().map(|&f| self.face_center(f)).sum::<DVec3>() / faces.len() as f64;

        let plane = Plane::new(center, normal);
        let vertices = self.faces_to_vertices(&faces);
        let targets: Vec<Option<DVec3>> = vertices.iter().map(|&v| Some(plane.project(self.positions[v]))).collect();
        self.write_positions(&vertices, targets);
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Arranges each connected vertex group as a regular polygon around its
    /// centroid, in the plane of its average normal. `cycle` rotates the
    /// starting corner.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` when a group has no usable normal; nothing moves
    /// in that case.
    pub fn make_ngon(&mut self, selection: &[usize], domain: Domain, cycle: usize) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let mut placed: Vec<usize> = Vec::new();
        let mut targets: Vec<Option<DVec3>> = Vec::new();

        for group in self.vertex_groups(&vertices) {
            let Some(center) = centroid(&self.positions, &group).filter(|_| group.len() >= 3) else {
                continue;
            };
            let normal = group
                .iter()
                .map(|&v| self.vertex_normal(v))
                .sum::<DVec3>()
                .try_normalize()
                .ok_or_else(|| MeshError::degenerate("vertex group has no average normal"))?;
            let up = normal
                .cross(DVec3::NEG_Y)
                .try_normalize()
                .unwrap_or_else(|| normal.cross(DVec3::X).normalize_or_zero());
            let frame = Frame::look_at(center, center - normal, up)?;

            let sides = group.len();
            let radius = group.iter().map(|&v| self.positions[v].distance(center)).sum::<f64>() / sides as f64;
            for (i, &v) in group.iter().enumerate() {
                let angle = TAU / sides as f64 * (i + cycle + 1) as f64;
                let local = DVec3::new(angle.sin() * radius, angle.cos() * radius, 0.0);
                placed.push(v);
                targets.push(Some(frame.apply(local)));
            }
        }

        self.write_positions(&placed, targets);
        self.refresh_vertex_normals(&placed);
        Ok(moved())
    }

    /// Scales each connected vertex group about its own centroid.
    pub fn scale_groups(&mut self, selection: &[usize], domain: Domain, scale: f64) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        for group in self.vertex_groups(&vertices) {
            let Some(center) = centroid(&self.positions, &group) else {
                continue;
            };
            let frame = Frame::scale_about(center, scale);
            let targets = group.iter().map(|&v| Some(frame.apply(self.positions[v]))).collect();
            self.write_positions(&group, targets);
        }
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    /// Spaces the vertices of each selected edge chain evenly along the
    /// chain. Open chains keep their end points.
    pub fn space_loop(&mut self, edges: &[usize]) -> Result<Vec<ChangeTag>, MeshError> {
        let chains = self.edge_groups(edges);
        let mut touched = Vec::new();
        for chain in &chains {
            let targets = self.even_spacing(chain);
            touched.extend_from_slice(&chain.vertices);
            self.write_positions(&chain.vertices, targets);
        }
        self.refresh_vertex_normals(&touched);
        Ok(moved())
    }

    /// Moves the vertices of each open edge chain onto the line through its
    /// end points.
    pub fn straighten_loop(&mut self, edges: &[usize]) -> Result<Vec<ChangeTag>, MeshError> {
        let chains = self.edge_groups(edges);
        let mut touched = Vec::new();
        for chain in &chains {
            if chain.closed {
                log::debug!("straighten: closed chain of {} vertices skipped", chain.vertices.len());
                continue;
            }
            let (Some(&first), Some(&last)) = (chain.vertices.first(), chain.vertices.last()) else {
                continue;
            };
            let (a, b) = (self.positions[first], self.positions[last]);
            let Some(dir) = (b - a).try_normalize() else {
                continue;
            };
            let targets = chain
                .vertices
                .iter()
                .map(|&v| Some(a + dir * dir.dot(self.positions[v] - a)))
                .collect();
            touched.extend_from_slice(&chain.vertices);
            self.write_positions(&chain.vertices, targets);
        }
        self.refresh_vertex_normals(&touched);
        Ok(moved())
    }

    /// Slides each selected edge chain across its rungs (see
    /// [`MeshKernel::loop_anchors`]). A positive `percent` moves toward the
    /// left rung end, a negative one toward the right; 1 lands on it.
    pub fn slide_loop(&mut self, edges: &[usize], percent: f64) -> Result<Vec<ChangeTag>, MeshError> {
        self.move_loops(edges, |mesh, v, [left, right]| {
            let p = mesh.positions[v];
            Some(if percent > 0.0 {
                p.lerp(mesh.positions[left], percent)
            } else {
                p.lerp(mesh.positions[right], -percent)
            })
        })
    }

    /// Moves each chain vertex to the middle of its rungs.
    ///
    /// A vertex off the line between the rung ends keeps part of its height
    /// above that line: half of it, or with `ellipse` the height of the
    /// ellipse through the vertex spanning the rung ends.
    pub fn center_loops(&mut self, edges: &[usize], ellipse: bool) -> Result<Vec<ChangeTag>, MeshError> {
        let tolerance = self.config.tolerance;
        self.move_loops(edges, |mesh, v, [left, right]| {
            let (a, b) = (mesh.positions[left], mesh.positions[right]);
            let (to_vertex, span) = (a - mesh.positions[v], a - b);
            let width = span.length();
            if width <= tolerance {
                return None;
            }

            let alpha = to_vertex.angle_between(span);
            let (x, height) = if alpha.abs() > tolerance {
                let x = to_vertex.length() * alpha.cos();
                let y = to_vertex.length() * alpha.sin();
                let height = if ellipse {
                    let q = 1.0 - (x * x) / (width * width);
                    if q > 0.0 {
                        (y * y / q).sqrt()
                    } else {
                        y
                    }
                } else {
                    y / 2.0
                };
                (x, height)
            } else {
                (to_vertex.length() / width, 0.0)
            };

            let lift = (to_vertex - span.normalize_or_zero() * x).normalize_or_zero() * height;
            Some(a.lerp(b, 0.5) - lift)
        })
    }

    /// Bends each chain toward the curve running through its rungs and the
    /// vertices one step further out, blended by `factor`. Vertices without
    /// a second ring on both sides stay put.
    pub fn flow_loop(&mut self, edges: &[usize], factor: f64) -> Result<Vec<ChangeTag>, MeshError> {
        self.move_loops(edges, |mesh, v, [left, right]| {
            let far_left = mesh.step_across(v, left)?;
            let far_right = mesh.step_across(v, right)?;
            let p = |u: usize| mesh.positions[u];
            let curve = [
                p(far_left).lerp(p(left), 0.5),
                p(left).lerp(p(far_left), -0.5),
                p(right).lerp(p(far_right), -0.5),
                p(right).lerp(p(far_right), 0.5),
            ];
            Some(p(v).lerp(bezier_midpoint(curve), factor))
        })
    }

    /// Moves the vertices of every selected chain that has rungs on both
    /// sides. Targets come from the unmoved mesh.
    fn move_loops<F>(&mut self, edges: &[usize], target: F) -> Result<Vec<ChangeTag>, MeshError>
    where
        F: Fn(&MeshKernel, usize, [usize; 2]) -> Option<DVec3>,
    {
        let mut vertices = Vec::new();
        let mut targets = Vec::new();
        for chain in self.edge_groups(edges) {
            for (anchors, &v) in self.loop_anchors(&chain).into_iter().zip(&chain.vertices) {
                vertices.push(v);
                targets.push(anchors.and_then(|rungs| target(self, v, rungs)));
            }
        }
        if targets.iter().all(Option::is_none) {
            return Ok(Vec::new());
        }
        self.write_positions(&vertices, targets);
        self.refresh_vertex_normals(&vertices);
        Ok(moved())
    }

    fn even_spacing(&self, chain: &EdgeChain) -> Vec<Option<DVec3>> {
        let mut path: Vec<DVec3> = chain.vertices.iter().map(|&v| self.positions[v]).collect();
        if chain.closed {
            path.push(path[0]);
        }
        let segments = path.len().saturating_sub(1);
        if segments < 2 {
            return vec![None; chain.vertices.len()];
        }

        let mut arc = vec![0.0];
        for w in path.windows(2) {
            arc.push(arc[arc.len() - 1] + w[0].distance(w[1]));
        }
        let total = arc[segments];

        chain
            .vertices
            .iter()
            .enumerate()
            .map(|(k, _)| {
                if k == 0 || (!chain.closed && k == segments) {
                    return None;
                }
                let s = total * k as f64 / segments as f64;
                let i = arc.partition_point(|&a| a <= s).clamp(1, segments);
                let span = arc[i] - arc[i - 1];
                let t = if span > 0.0 { (s - arc[i - 1]) / span } else { 0.0 };
                Some(path[i - 1].lerp(path[i], t))
            })
            .collect()
    }

    /// Writes new positions for `vertices`; `None` leaves a vertex where it
    /// is.
    fn write_positions(&mut self, vertices: &[usize], targets: Vec<Option<DVec3>>) {
        for (&v, target) in vertices.iter().zip(targets) {
            if let Some(p) = target {
                self.set_position(v, p);
            }
        }
    }
}

/// Point at `t = 0.5` on the cubic Bezier curve with the given controls.
fn bezier_midpoint([p0, p1, p2, p3]: [DVec3; 4]) -> DVec3 {
    (p0 + (p1 + p2) * 3.0 + p3) / 8.0
}
