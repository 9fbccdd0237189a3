use super::{AppCommand, AppModel, Phase, View};
use crossterm::event::{MouseEvent, MouseEventKind};

const SCROLL_STEP: usize = 3;

pub(super) fn update_on_mouse(model: AppModel, mouse: MouseEvent) -> (AppModel, AppCommand) {
    let direction = match mouse.kind {
        MouseEventKind::ScrollUp => ScrollDirection::Up,
        MouseEventKind::ScrollDown => ScrollDirection::Down,
        _ => return (model, AppCommand::None),
    };
    if model.phase != Phase::Ready || model.help_open {
        return (model, AppCommand::None);
    }

    (apply_scroll(model, direction), AppCommand::None)
}

#[derive(Clone, Copy, Debug)]
enum ScrollDirection {
    Up,
    Down,
}

fn apply_scroll(mut model: AppModel, direction: ScrollDirection) -> AppModel {
    match &mut model.view {
        View::List => {
            if let Some(list) = model.list.as_mut() {
                match direction {
                    ScrollDirection::Up => list.move_up(SCROLL_STEP),
                    ScrollDirection::Down => list.move_down(SCROLL_STEP),
                }
            }
        }
        View::Detail(detail) => {
            let step = SCROLL_STEP as u16;
            detail.scroll = match direction {
                ScrollDirection::Up => detail.scroll.saturating_sub(step),
                ScrollDirection::Down => detail.scroll.saturating_add(step),
            };
        }
    }
    model
}
