//! Bookkeeping for points that still lie outside the hull.
//!
//! The claimed list keeps each face's outside set as one contiguous run that
//! starts at `Face::outside`; a run ends at the first vertex claimed by some
//! other face.

use crate::mesh::{FaceId, Vertex, VertexId, VertexState};

/// Doubly-linked list threaded through the `prev`/`next` links of the vertex
/// arena.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct VertexList {
    head: Option<VertexId>,
    tail: Option<VertexId>,
}

impl VertexList {
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    pub fn first(&self) -> Option<VertexId> {
        self.head
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn add(&mut self, vertices: &mut [Vertex], v: VertexId) {
        match self.tail {
            None => self.head = Some(v),
            Some(tail) => vertices[tail.0].next = Some(v),
        }
        vertices[v.0].prev = self.tail;
        vertices[v.0].next = None;
        self.tail = Some(v);
    }

    /// Appends the chain starting at `first` and running until a vertex with
    /// no `next`.
    pub fn add_all(&mut self, vertices: &mut [Vertex], first: VertexId) {
        match self.tail {
            None => self.head = Some(first),
            Some(tail) => vertices[tail.0].next = Some(first),
        }
        vertices[first.0].prev = self.tail;

        let mut last = first;
        while let Some(next) = vertices[last.0].next {
            last = next;
        }
        self.tail = Some(last);
    }

    pub fn delete(&mut self, vertices: &mut [Vertex], v: VertexId) {
        self.delete_range(vertices, v, v);
    }

    /// Unlinks the run `first..=last`. The run keeps its internal links.
    pub fn delete_range(&mut self, vertices: &mut [Vertex], first: VertexId, last: VertexId) {
        let before = vertices[first.0].prev;
        let after = vertices[last.0].next;
        match before {
            None => self.head = after,
            Some(b) => vertices[b.0].next = after,
        }
        match after {
            None => self.tail = before,
            Some(a) => vertices[a.0].prev = before,
        }
    }

    pub fn insert_before(&mut self, vertices: &mut [Vertex], v: VertexId, next: VertexId) {
        let prev = vertices[next.0].prev;
        vertices[v.0].prev = prev;
        match prev {
            None => self.head = Some(v),
            Some(p) => vertices[p.0].next = Some(v),
        }
        vertices[v.0].next = Some(next);
        vertices[next.0].prev = Some(v);
    }

    #[cfg(test)]
    pub fn iter<'a>(&self, vertices: &'a [Vertex]) -> impl Iterator<Item = VertexId> + 'a {
        chain(vertices, self.head)
    }
}

/// Follows `next` links from `start` to the end of the chain.
pub(crate) fn chain(
    vertices: &[Vertex],
    start: Option<VertexId>,
) -> impl Iterator<Item = VertexId> + '_ {
    std::iter::successors(start, move |v| vertices[v.0].next)
}

/// The outside set of `face`, given its first vertex.
pub(crate) fn outside_set(
    vertices: &[Vertex],
    face: FaceId,
    start: Option<VertexId>,
) -> impl Iterator<Item = VertexId> + '_ {
    chain(vertices, start).take_while(move |v| vertices[v.0].state == VertexState::Claimed(face))
}

/// Faces created or touched during one insertion step, in creation order.
#[derive(Clone, Debug, Default)]
pub(crate) struct FaceList(Vec<FaceId>);

impl FaceList {
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn push(&mut self, face: FaceId) {
        self.0.push(face);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[FaceId] {
        &self.0
    }
}
