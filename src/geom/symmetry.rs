//! Replays segment draws, bounds and iteration once per symmetry transform.
//!
//! Everything here resolves the active assembly first. With no assembly
//! (or a dangling assembly name) every segment is visited once under the
//! identity transform. Otherwise each generator restricts the segments to
//! its chains, and that subset is visited once per generator transform.

use glam::{Mat4, Vec3};

use super::vertex_array::VertexArray;
use crate::camera::Camera;
use crate::gpu::{uniforms, ContextError, RenderContext, ShaderHandle};
use crate::mol::{Assembly, CentralAtom, Structure, SymmetryGenerator};
use crate::picking::{pick_symmetry_index, MAX_PICK_SYMMETRY_INDEX};
use crate::util::Interval;

/// Which copies of a structure a container renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ShowRelated {
    /// Only the asymmetric unit.
    #[default]
    Asym,
    /// Every copy produced by the named assembly.
    Assembly(String),
}

impl ShowRelated {
    /// Parse the persisted form: `"asym"` or an assembly name.
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() || name.eq_ignore_ascii_case("asym") {
            Self::Asym
        } else {
            Self::Assembly(name.to_owned())
        }
    }

    /// Persisted form.
    pub fn name(&self) -> &str {
        match self {
            Self::Asym => "asym",
            Self::Assembly(name) => name,
        }
    }
}

/// One segment visited under one transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    /// Segment index.
    pub segment: usize,
    /// Running transform index over the whole assembly; 0 for the
    /// asymmetric unit.
    pub symmetry_index: u32,
    /// Transform applied to the segment.
    pub transform: Mat4,
}

/// The assembly to expand, or `None` for the asymmetric unit.
///
/// A name the structure does not define logs a warning and degrades to the
/// asymmetric unit.
pub fn active_assembly<'a>(
    structure: &'a Structure,
    show: &ShowRelated,
) -> Option<&'a Assembly> {
    match show {
        ShowRelated::Asym => None,
        ShowRelated::Assembly(name) => {
            let assembly = structure.assembly(name);
            if assembly.is_none() {
                log::warn!(
                    "structure '{}' has no assembly '{name}', showing the \
                     asymmetric unit",
                    structure.name()
                );
            }
            assembly
        }
    }
}

/// Indices of the segments whose chain `generator` lists.
pub fn segments_involving(
    segments: &[VertexArray],
    generator: &SymmetryGenerator,
) -> Vec<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| generator.covers(segment.chain()))
        .map(|(index, _)| index)
        .collect()
}

/// Every `(segment, transform)` pair to visit, in generator, transform,
/// segment order.
pub fn instances(
    segments: &[VertexArray],
    assembly: Option<&Assembly>,
) -> Vec<Instance> {
    let Some(assembly) = assembly else {
        return (0..segments.len())
            .map(|segment| Instance {
                segment,
                symmetry_index: 0,
                transform: Mat4::IDENTITY,
            })
            .collect();
    };

    let mut out = Vec::new();
    let mut symmetry_index = 0;
    for generator in assembly.generators() {
        let subset = segments_involving(segments, generator);
        for transform in generator.matrices() {
            out.extend(subset.iter().map(|&segment| Instance {
                segment,
                symmetry_index,
                transform: *transform,
            }));
            symmetry_index += 1;
        }
    }
    out
}

/// Draw every instance with `shader`. Returns the number of draws issued.
///
/// The symmetry index uniform saturates at [`MAX_PICK_SYMMETRY_INDEX`], so
/// later copies of a very large assembly pick as that copy.
///
/// # Errors
///
/// Stops at the first [`ContextError`].
pub fn draw_segments(
    ctx: &mut dyn RenderContext,
    camera: &dyn Camera,
    shader: ShaderHandle,
    segments: &mut [VertexArray],
    assembly: Option<&Assembly>,
) -> Result<usize, ContextError> {
    let plan = instances(segments, assembly);
    let pickable = u32::from(MAX_PICK_SYMMETRY_INDEX) + 1;
    let copies = plan.iter().map(|i| i.symmetry_index + 1).max();
    if let Some(copies) = copies.filter(|&c| c > pickable) {
        log::warn!(
            "{copies} symmetry copies exceed the {pickable} that picking can \
             tell apart"
        );
    }
    let mut issued = 0;
    for instance in &plan {
        let segment = &mut segments[instance.segment];
        if segment.num_verts() == 0 {
            continue;
        }
        segment.bind(ctx)?;
        camera.bind(ctx, shader, &instance.transform);
        let sym_id = pick_symmetry_index(instance.symmetry_index);
        ctx.set_uniform_i32(uniforms::SYM_ID, i32::from(sym_id));
        segment.draw(ctx)?;
        segment.release_attribs(ctx);
        issued += 1;
    }
    log::trace!(
        "drew {issued} segment instances ({} segments)",
        segments.len()
    );
    Ok(issued)
}

/// Widen `intervals[i]` by the projection of every transformed vertex onto
/// `axes[i]`.
pub fn update_projection_intervals(
    segments: &[VertexArray],
    assembly: Option<&Assembly>,
    axes: &[Vec3; 3],
    intervals: &mut [Interval; 3],
) {
    for instance in instances(segments, assembly) {
        for position in segments[instance.segment].positions() {
            let p = instance.transform.transform_point3(position);
            for (axis, interval) in axes.iter().zip(intervals.iter_mut()) {
                interval.update(p.dot(*axis));
            }
        }
    }
}

/// Largest of `radius_sq` and the squared distance of every transformed
/// vertex from `center`.
pub fn update_squared_sphere_radius(
    segments: &[VertexArray],
    assembly: Option<&Assembly>,
    center: Vec3,
    radius_sq: f32,
) -> f32 {
    instances(segments, assembly)
        .iter()
        .flat_map(|instance| {
            segments[instance.segment]
                .positions()
                .map(|p| instance.transform.transform_point3(p))
        })
        .map(|p| p.distance_squared(center))
        .fold(radius_sq, f32::max)
}

/// One central atom per residue, repeated per generator transform for the
/// generator's chains, with the transform applied to the position.
pub fn central_atoms<'a>(
    structure: &'a Structure,
    assembly: Option<&'a Assembly>,
) -> Box<dyn Iterator<Item = CentralAtom> + 'a> {
    let Some(assembly) = assembly else {
        return Box::new(structure.central_atoms());
    };
    Box::new(assembly.generators().iter().flat_map(move |generator| {
        generator.matrices().iter().flat_map(move |transform| {
            structure
                .chains_by_name(generator.chains())
                .flat_map(move |chain| {
                    let first = chain.residues.start;
                    structure.residues_of(chain).iter().zip(first..).filter_map(
                        move |(residue, index)| {
                            let atom = residue.central_atom()?;
                            Some(CentralAtom {
                                atom,
                                residue: index,
                                position: transform.transform_point3(
                                    structure.atom(atom).position,
                                ),
                            })
                        },
                    )
                })
        })
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::camera::FixedCamera;
    use crate::geom::VertexLayout;
    use crate::gpu::CommandRecorder;
    use crate::mol::StructureBuilder;

    const WHITE: [f32; 4] = [1.0; 4];

    /// Keeps every record logged while the test binary runs.
    struct CaptureLogger {
        records: Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };

    fn install_logger() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    }

    /// Warnings logged so far that mention `needle`.
    fn warnings_mentioning(needle: &str) -> usize {
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .filter(|(_, msg)| msg.contains(needle))
            .count()
    }

    fn segment(chain: &str, points: &[Vec3]) -> VertexArray {
        let mut seg =
            VertexArray::new(chain, VertexLayout::Lines, points.len(), 0);
        for pair in points.chunks_exact(2) {
            seg.add_line(pair[0], WHITE, pair[1], WHITE, 0, 0);
        }
        seg
    }

    fn assembly() -> Assembly {
        let shift = |x: f32| Mat4::from_translation(Vec3::new(x, 0.0, 0.0));
        Assembly::new(
            "1",
            vec![
                SymmetryGenerator::new(
                    ["A"],
                    vec![shift(0.0), shift(10.0), shift(20.0)],
                ),
                SymmetryGenerator::new(["B"], vec![shift(0.0)]),
            ],
        )
    }

    fn structure() -> Structure {
        let mut b = StructureBuilder::new("s");
        let _ = b.chain("A").residue("ALA", 1);
        let _ = b.atom("CA", "C", Vec3::ZERO);
        let _ = b.chain("B").residue("GLY", 1);
        let _ = b.atom("CA", "C", Vec3::Y);
        let _ = b.assembly(assembly());
        b.build()
    }

    #[test]
    fn instances_follow_generator_transform_segment_order() {
        let segments = vec![
            segment("A", &[Vec3::ZERO, Vec3::X]),
            segment("B", &[Vec3::ZERO, Vec3::Y]),
        ];
        let a = assembly();
        let plan = instances(&segments, Some(&a));
        let order: Vec<_> =
            plan.iter().map(|i| (i.segment, i.symmetry_index)).collect();
        assert_eq!(order, [(0, 0), (0, 1), (0, 2), (1, 3)]);

        let asym = instances(&segments, None);
        assert_eq!(asym.len(), 2);
        assert!(asym.iter().all(|i| i.transform == Mat4::IDENTITY));
    }

    #[test]
    fn missing_assembly_warns_and_degrades_to_asym() {
        install_logger();

        let s = structure();
        let dangling = ShowRelated::Assembly("bio-7".into());
        assert!(active_assembly(&s, &dangling).is_none());
        assert_eq!(warnings_mentioning("bio-7"), 1);

        assert!(active_assembly(&s, &ShowRelated::Asym).is_none());
        assert!(active_assembly(&s, &ShowRelated::from_name("1")).is_some());
        assert_eq!(warnings_mentioning("bio-7"), 1);
    }

    #[test]
    fn symmetry_uniform_saturates_past_pickable_copies() {
        install_logger();
        let shifts = (0..300u16)
            .map(|i| Mat4::from_translation(Vec3::new(f32::from(i), 0.0, 0.0)))
            .collect();
        let many = Assembly::new(
            "many",
            vec![SymmetryGenerator::new(["A"], shifts)],
        );
        let mut segments = vec![segment("A", &[Vec3::ZERO, Vec3::X])];
        let mut ctx = CommandRecorder::new();
        let issued = draw_segments(
            &mut ctx,
            &FixedCamera::default(),
            ShaderHandle(1),
            &mut segments,
            Some(&many),
        )
        .unwrap();
        assert_eq!(issued, 300);

        let sym_ids: Vec<_> =
            ctx.draws().iter().map(|d| d.uniforms.sym_id).collect();
        assert_eq!(sym_ids[10], 10);
        assert_eq!(sym_ids[255], 255);
        assert!(sym_ids[256..].iter().all(|&id| id == 255));
        assert_eq!(warnings_mentioning("300 symmetry copies"), 1);
    }

    #[test]
    fn intervals_cover_every_copy() {
        let segments = vec![segment("A", &[Vec3::ZERO, Vec3::X])];
        let a = assembly();
        let mut intervals = [Interval::EMPTY; 3];
        update_projection_intervals(
            &segments,
            Some(&a),
            &[Vec3::X, Vec3::Y, Vec3::Z],
            &mut intervals,
        );
        assert_eq!(intervals[0].min(), Some(0.0));
        assert_eq!(intervals[0].max(), Some(21.0));
        assert_eq!(intervals[1].length(), 0.0);
    }

    #[test]
    fn radius_starts_from_accumulator() {
        let segments = vec![segment("A", &[Vec3::ZERO, Vec3::X])];
        let a = assembly();
        let radius = |assembly: Option<&Assembly>, start| {
            update_squared_sphere_radius(&segments, assembly, Vec3::ZERO, start)
        };
        assert_eq!(radius(None, 4.0), 4.0);
        assert_eq!(radius(None, 0.0), 1.0);
        assert_eq!(radius(Some(&a), 0.0), 441.0);
    }

    #[test]
    fn central_atoms_are_transformed_per_copy() {
        let s = structure();
        let asym: Vec<_> = central_atoms(&s, None).collect();
        assert_eq!(asym.len(), 2);

        let a = s.assembly("1");
        let copies: Vec<_> =
            central_atoms(&s, a).map(|c| c.position).collect();
        assert_eq!(
            copies,
            [
                Vec3::ZERO,
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(20.0, 0.0, 0.0),
                Vec3::Y,
            ]
        );
        // restartable
        assert_eq!(central_atoms(&s, a).count(), 4);
    }
}
