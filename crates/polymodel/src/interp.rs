//! Decompiling interpreter bytecode back into faces and submodels.
//!
//! The walk visits both branches of every sort node, so the result is the
//! complete polygon soup of each submodel rather than one viewer's paint
//! order. The buffer is treated as untrusted: anything that is not a valid
//! instruction is an error, never skipped.

use byteorder::{LE, ReadBytesExt};
use log::{debug, trace};

use crate::errors::{FormatError, Result};
use crate::face::{Face, Surface, Vertex};
use crate::fix::FixVec;
use crate::model::{PolyModel, Submodel};
use crate::op::{self, Opcode};

/// Deepest nesting of sort and call instructions followed.
pub const MAX_DEPTH: usize = 512;

impl PolyModel {
    /// Rebuilds a model from an instruction buffer whose root submodel starts
    /// at offset 0.
    pub fn decompile(data: &[u8]) -> Result<PolyModel> {
        Self::decompile_at(data, 0)
    }

    /// Rebuilds a model from an instruction buffer, starting at `entry`.
    ///
    /// Submodel indices come from the call instructions; every index below
    /// the highest one called must be present exactly once.
    pub fn decompile_at(data: &[u8], entry: usize) -> Result<PolyModel> {
        let mut interpreter = Interpreter::new(data);
        interpreter.run(entry)?;
        let model = interpreter.into_model()?;

        debug!(
            "decompiled {} submodels, {} faces from {} bytes",
            model.submodels.len(),
            model.face_count(),
            data.len()
        );
        Ok(model)
    }
}

/// State of one decompile: the working vertex table and one geometry bucket
/// per submodel met so far.
pub struct Interpreter<'a> {
    data: &'a [u8],
    points: Vec<Option<FixVec>>,
    buckets: Vec<Option<Bucket>>,
    /// Instruction offsets already executed. Compiled code runs each
    /// instruction exactly once.
    executed: Vec<bool>,
}

#[derive(Debug, Default)]
struct Bucket {
    parent: Option<usize>,
    offset: FixVec,
    pointer: usize,
    faces: Vec<Face>,
}

impl<'a> Interpreter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            points: Vec::new(),
            buckets: Vec::new(),
            executed: vec![false; data.len()],
        }
    }

    /// Interprets the root submodel at `entry` and everything it calls.
    pub fn run(&mut self, entry: usize) -> Result<()> {
        self.buckets = vec![Some(Bucket {
            pointer: entry,
            ..Bucket::default()
        })];
        self.walk(entry, 0, 0)
    }

    /// Assembles the buckets into a model.
    pub fn into_model(self) -> Result<PolyModel> {
        let mut model = PolyModel {
            submodels: Vec::with_capacity(self.buckets.len()),
            data: self.data.to_vec(),
        };

        let mut links = Vec::new();
        for (index, bucket) in self.buckets.into_iter().enumerate() {
            let bucket = bucket.ok_or(FormatError::MissingSubmodel { index })?;
            if let Some(parent) = bucket.parent {
                links.push((parent, index));
            }
            model.submodels.push(Submodel {
                offset: bucket.offset,
                pointer: bucket.pointer,
                faces: bucket.faces,
                ..Submodel::default()
            });
        }
        // a child may be called from a submodel with a higher index
        for (parent, child) in links {
            model.attach(parent, child)?;
        }

        model.update_bounds();
        Ok(model)
    }

    /// Runs instructions from `at` until an End, adding faces to submodel
    /// `current`.
    fn walk(&mut self, mut at: usize, current: usize, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(FormatError::TooDeep(MAX_DEPTH).into());
        }

        loop {
            let opcode = self.slice(at, 2)?.read_u16::<LE>()?;
            if std::mem::replace(&mut self.executed[at], true) {
                return Err(FormatError::SharedBranch { at }.into());
            }
            match Opcode::try_from((opcode, at))? {
                Opcode::End => return Ok(()),
                Opcode::DefinePoints | Opcode::DefinePointStart => {
                    at += self.define_points(at)?;
                }
                Opcode::FlatPoly => {
                    let (face, size) = self.read_poly(at, false)?;
                    self.bucket(current).faces.push(face);
                    at += size;
                }
                Opcode::TexturedPoly => {
                    let (face, size) = self.read_poly(at, true)?;
                    self.bucket(current).faces.push(face);
                    at += size;
                }
                Opcode::SortNormal => {
                    let mut fields = self.slice(at + op::SORT_BACK_FIELD, 4)?;
                    let back = fields.read_i16::<LE>()?;
                    let front = fields.read_i16::<LE>()?;
                    trace!("sort at {}: front {:+}, back {:+}", at, front, back);

                    let (front, back) = (self.jump(at, front)?, self.jump(at, back)?);
                    self.walk(front, current, depth + 1)?;
                    self.walk(back, current, depth + 1)?;
                    at += op::SORT_NORMAL_SIZE;
                }
                Opcode::SubCall => {
                    self.call(at, current, depth)?;
                    at += op::SUB_CALL_SIZE;
                }
            }
        }
    }

    fn call(&mut self, at: usize, current: usize, depth: usize) -> Result<()> {
        let mut fields = self.slice(at + 2, op::SUB_CALL_SIZE - 2)?;
        let raw_index = fields.read_i16::<LE>()?;
        let offset = FixVec::read(&mut fields)?;
        let jump = fields.read_i16::<LE>()?;

        let index = usize::try_from(raw_index)
            .ok()
            .filter(|&i| i > 0)
            .ok_or(FormatError::BadSubmodel { at, index: raw_index })?;
        let target = self.jump(at, jump)?;

        if self.buckets.len() <= index {
            self.buckets.resize_with(index + 1, || None);
        }
        if self.buckets[index].is_some() {
            return Err(FormatError::DuplicateSubmodel { index }.into());
        }
        self.buckets[index] = Some(Bucket {
            parent: Some(current),
            offset,
            pointer: target,
            faces: Vec::new(),
        });

        trace!("call at {}: submodel {} at {}", at, index, target);
        self.walk(target, index, depth + 1)
    }

    /// Stores a point block in the vertex table. Returns the instruction size.
    fn define_points(&mut self, at: usize) -> Result<usize> {
        let mut header = self.slice(at + 2, op::POINTS_HEADER_SIZE - 2)?;
        let count = header.read_i16::<LE>()?;
        let first = header.read_i16::<LE>()?;
        if count < 0 {
            return Err(FormatError::BadCount { at, count }.into());
        }
        if first < 0 {
            return Err(FormatError::BadCount { at, count: first }.into());
        }

        let (count, first) = (count as usize, first as usize);
        let mut points = self.slice(at + op::POINTS_HEADER_SIZE, count * FixVec::SIZE)?;
        if self.points.len() < first + count {
            self.points.resize(first + count, None);
        }
        for slot in &mut self.points[first..first + count] {
            *slot = Some(FixVec::read(&mut points)?);
        }
        Ok(op::POINTS_HEADER_SIZE + count * FixVec::SIZE)
    }

    /// Decodes a polygon instruction. Returns the face and the instruction
    /// size.
    fn read_poly(&self, at: usize, textured: bool) -> Result<(Face, usize)> {
        let mut header = self.slice(at + 2, op::POLY_HEADER_SIZE - 2)?;
        let count = header.read_i16::<LE>()?;
        if count < 3 {
            return Err(FormatError::BadCount { at, count }.into());
        }
        let point = FixVec::read(&mut header)?;
        let normal = FixVec::read(&mut header)?;
        let surface = match header.read_u16::<LE>()? {
            texture if textured => Surface::Textured(texture),
            color => Surface::Flat(color),
        };

        let count = count as usize;
        let size = op::poly_size(count, textured);
        let body = self.slice(at, size)?;

        let mut indices = &body[op::POLY_HEADER_SIZE..];
        let mut uvs = &body[op::POLY_HEADER_SIZE + op::index_list_len(count) * 2..];
        let mut vertices = Vec::with_capacity(count);
        for _ in 0..count {
            let index = indices.read_i16::<LE>()?;
            let position = usize::try_from(index)
                .ok()
                .and_then(|i| self.points.get(i).copied().flatten())
                .ok_or(FormatError::UndefinedVertex { at, index })?;
            let uv = if textured {
                Some(FixVec::read(&mut uvs)?)
            } else {
                None
            };
            vertices.push(Vertex { position, uv });
        }

        let face = Face {
            vertices,
            point,
            normal,
            surface,
        };
        Ok((face, size))
    }

    fn bucket(&mut self, index: usize) -> &mut Bucket {
        // buckets are created before they are walked
        self.buckets[index].get_or_insert_with(Bucket::default)
    }

    /// `len` bytes at `at`, or a truncation error.
    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        at.checked_add(len)
            .and_then(|end| self.data.get(at..end))
            .ok_or_else(|| FormatError::Truncated { at }.into())
    }

    fn jump(&self, at: usize, offset: i16) -> Result<usize> {
        let target = at as i64 + i64::from(offset);
        if target < 0 || target >= self.data.len() as i64 {
            return Err(FormatError::BadJump { at, offset }.into());
        }
        Ok(target as usize)
    }
}
