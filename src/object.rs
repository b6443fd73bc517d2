use crate::rect::Rect;

/*------------------------------------------------------------------------------
ObjectClass enum
------------------------------------------------------------------------------*/

/// Category reported by the detector, if it reports one at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Classified(usize),
    Unclassified,
}

/*------------------------------------------------------------------------------
Object struct
------------------------------------------------------------------------------*/

/// A single per-frame detection.
///
/// `track_id` is empty on input and holds the resolved long-term identity on
/// output. Detections of ignored classes keep `track_id == None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    rect: Rect<f32>,
    class: ObjectClass,
    prob: Option<f32>,
    track_id: Option<usize>,
}

impl Object {
    pub fn new(rect: Rect<f32>, prob: Option<f32>, track_id: Option<usize>) -> Self {
        Self {
            rect,
            class: ObjectClass::Unclassified,
            prob,
            track_id,
        }
    }

    pub fn with_class(self, class_id: usize) -> Self {
        Self {
            class: ObjectClass::Classified(class_id),
            ..self
        }
    }

    pub fn get_rect(&self) -> &Rect<f32> {
        &self.rect
    }

    pub fn get_class(&self) -> ObjectClass {
        self.class
    }

    pub fn get_prob(&self) -> Option<f32> {
        self.prob
    }

    pub fn get_track_id(&self) -> Option<usize> {
        self.track_id
    }

    pub(crate) fn set_track_id(&mut self, track_id: Option<usize>) {
        self.track_id = track_id;
    }
}
