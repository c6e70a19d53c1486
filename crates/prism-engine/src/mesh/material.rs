use std::rc::Rc;

use crate::texture::{Texture, TextureKind};

/// A texture bound to a mesh under `texture_<kind><slot>`.
#[derive(Debug, Clone)]
pub struct MaterialSlot {
    pub kind: TextureKind,
    pub slot: u32,
    pub texture: Rc<Texture>,
}

impl MaterialSlot {
    pub fn binding_name(&self) -> String {
        binding_name(self.kind, self.slot)
    }
}

/// `texture_diffuse0`, `texture_specular1`, ...
pub fn binding_name(kind: TextureKind, slot: u32) -> String {
    format!("texture_{}{slot}", kind.as_str())
}

/// Numbers textures per kind in list order, starting at 0 for every kind.
pub fn assign_slots(kinds: impl IntoIterator<Item = TextureKind>) -> Vec<(TextureKind, u32)> {
    let mut diffuse = 0;
    let mut specular = 0;

    kinds
        .into_iter()
        .map(|kind| {
            let counter = match kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
            };
            let slot = *counter;
            *counter += 1;
            (kind, slot)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use TextureKind::{Diffuse, Specular};

    #[test]
    fn slots_count_per_kind_from_zero() {
        let slots = assign_slots([Diffuse, Specular, Diffuse, Diffuse, Specular]);
        assert_eq!(
            slots,
            vec![(Diffuse, 0), (Specular, 0), (Diffuse, 1), (Diffuse, 2), (Specular, 1)]
        );
    }

    #[test]
    fn empty_list_has_no_slots() {
        assert!(assign_slots([]).is_empty());
    }

    #[test]
    fn binding_names() {
        assert_eq!(binding_name(Diffuse, 0), "texture_diffuse0");
        assert_eq!(binding_name(Specular, 2), "texture_specular2");
    }
}
