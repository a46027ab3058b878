//! Alternative sets as tuples.
//!
//! One macro invocation per arity generates the per-set discriminant tables:
//! the operation table, the registry description, visitor dispatch and
//! serialization. Each is a single `match` on the discriminant.

use serde::{Serialize, Serializer};

use crate::alternative::Alternative;
use crate::registry::Descriptor;
use crate::serde_impl::SerializeSet;
use crate::slot::{AltOps, Slot};
use crate::value::{sealed::Sealed, AlternativeSet};
use crate::visit::{Dispatch, DispatchMut, Visit, VisitMut, Visitor};

fn out_of_range<S>(tag: u8) -> ! {
    unreachable!(
        "discriminant {tag} is out of range for `{}`",
        std::any::type_name::<S>()
    )
}

macro_rules! tuple_set {
    ($len:expr; $($idx:literal => $t:ident),+) => {
        impl<$($t: Alternative),+> Sealed for ($($t,)+) {}

        impl<$($t: Alternative),+> AlternativeSet for ($($t,)+) {
            const LEN: usize = $len;

            fn ops(tag: u8) -> AltOps {
                match tag {
                    $($idx => AltOps::of::<$t>(),)+
                    _ => out_of_range::<Self>(tag),
                }
            }

            fn describe(out: &mut Vec<Descriptor>) {
                $(out.push(Descriptor::of::<$t>());)+
            }
        }

        impl<V, A, $($t: Alternative),+> Dispatch<V, A> for ($($t,)+)
        where
            V: Visitor $(+ Visit<$t, A>)+,
        {
            unsafe fn dispatch(tag: u8, slot: &Slot, visitor: &mut V, args: A) -> V::Output {
                match tag {
                    $($idx => <V as Visit<$t, A>>::visit(visitor, unsafe { slot.get::<$t>() }, args),)+
                    _ => out_of_range::<Self>(tag),
                }
            }
        }

        impl<V, A, $($t: Alternative),+> DispatchMut<V, A> for ($($t,)+)
        where
            V: Visitor $(+ VisitMut<$t, A>)+,
        {
            unsafe fn dispatch_mut(tag: u8, slot: &mut Slot, visitor: &mut V, args: A) -> V::Output {
                match tag {
                    $($idx => <V as VisitMut<$t, A>>::visit_mut(visitor, unsafe { slot.get_mut::<$t>() }, args),)+
                    _ => out_of_range::<Self>(tag),
                }
            }
        }

        impl<$($t: Alternative + Serialize),+> SerializeSet for ($($t,)+) {
            unsafe fn serialize_slot<Ser: Serializer>(
                tag: u8,
                slot: &Slot,
                serializer: Ser,
            ) -> Result<Ser::Ok, Ser::Error> {
                match tag {
                    $($idx => unsafe { slot.get::<$t>() }.serialize(serializer),)+
                    _ => out_of_range::<Self>(tag),
                }
            }
        }
    };
}

tuple_set!(1; 0 => T0);
tuple_set!(2; 0 => T0, 1 => T1);
tuple_set!(3; 0 => T0, 1 => T1, 2 => T2);
tuple_set!(4; 0 => T0, 1 => T1, 2 => T2, 3 => T3);
tuple_set!(5; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4);
tuple_set!(6; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5);
tuple_set!(7; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6);
tuple_set!(8; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7);
tuple_set!(9; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8);
tuple_set!(10; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8, 9 => T9);
tuple_set!(11; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8, 9 => T9, 10 => T10);
tuple_set!(12; 0 => T0, 1 => T1, 2 => T2, 3 => T3, 4 => T4, 5 => T5, 6 => T6, 7 => T7, 8 => T8, 9 => T9, 10 => T10, 11 => T11);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternative::Null;

    #[test]
    fn lengths_follow_arity() {
        assert_eq!(<(Null,)>::LEN, 1);
        assert_eq!(<(Null, bool, u8, u16, u32, u64, i8, i16, i32, i64, f64, String)>::LEN, 12);
    }

    #[test]
    fn ops_follow_declaration_order() {
        type Set = (Null, String, u8);
        assert!(Set::ops(0).is::<Null>());
        assert!(Set::ops(1).is::<String>());
        assert!(Set::ops(2).is::<u8>());
        let mut out = Vec::new();
        Set::describe(&mut out);
        let names: Vec<_> = out.iter().map(|d| d.name).collect();
        assert_eq!(names, [std::any::type_name::<Null>(), std::any::type_name::<String>(), "u8"]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn ops_reject_unknown_discriminants() {
        <(Null, bool)>::ops(2);
    }
}
